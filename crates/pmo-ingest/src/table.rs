use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use csv::ReaderBuilder;
use serde::Serialize;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Delimiters considered by [`sniff_delimiter`], in tie-break order.
pub const DELIMITERS: [u8; 4] = [b',', b'\t', b';', b'|'];

/// An input table with unique, non-empty headers.
///
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell at `row` for `header`; `None` for an unknown header or row.
    pub fn cell(&self, row: usize, header: &str) -> Option<&str> {
        let idx = self.column_index(header)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Supported table file types, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Tsv,
    Text,
    /// First worksheet of an xlsx, xlsm, xls or ods workbook.
    Excel,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "txt" => Ok(Self::Text),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Excel),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }

    /// Delimiter used when the header line gives no hint.
    fn fallback_delimiter(self) -> u8 {
        match self {
            Self::Tsv => b'\t',
            Self::Csv | Self::Text | Self::Excel => b',',
        }
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Picks the delimiter that occurs most often, outside quotes, in the first
/// non-blank line. Returns `None` when no candidate occurs.
pub fn sniff_delimiter(text: &str) -> Option<u8> {
    let line = text.lines().find(|line| !line.trim().is_empty())?;
    let mut counts = [0usize; DELIMITERS.len()];
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(slot) = DELIMITERS.iter().position(|d| *d == byte) {
            counts[slot] += 1;
        }
    }
    let mut best: Option<(usize, usize)> = None;
    for (slot, count) in counts.iter().copied().enumerate() {
        if count == 0 {
            continue;
        }
        if best.is_none_or(|(_, top)| count > top) {
            best = Some((slot, count));
        }
    }
    best.map(|(slot, _)| DELIMITERS[slot])
}

/// Parses delimited text. `origin` is only used in error messages.
pub fn parse_table(text: &str, delimiter: u8, origin: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: origin.to_path_buf(),
            source,
        })?;
        let row: Vec<String> = record.iter().map(normalize_cell).collect();
        if row.iter().all(|value| value.is_empty()) {
            continue;
        }
        raw_rows.push(row);
    }

    build_table(raw_rows, origin)
}

/// Turns the first row into headers and pads or truncates the rest to match.
/// Blank rows must already be dropped.
fn build_table(raw_rows: Vec<Vec<String>>, origin: &Path) -> Result<Table> {
    let mut raw_rows = raw_rows.into_iter();
    let Some(header_row) = raw_rows.next() else {
        return Err(IngestError::EmptyTable {
            path: origin.to_path_buf(),
        });
    };

    let mut seen = BTreeSet::new();
    let mut headers = Vec::with_capacity(header_row.len());
    for (position, raw) in header_row.iter().enumerate() {
        let header = normalize_header(raw);
        if header.is_empty() {
            return Err(IngestError::EmptyHeader {
                path: origin.to_path_buf(),
                position: position + 1,
            });
        }
        if !seen.insert(header.clone()) {
            return Err(IngestError::DuplicateHeader {
                path: origin.to_path_buf(),
                header,
            });
        }
        headers.push(header);
    }

    let rows = raw_rows
        .map(|mut row| {
            row.resize(headers.len(), String::new());
            row
        })
        .collect();
    Ok(Table { headers, rows })
}

fn excel_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        _ => normalize_cell(&cell.to_string()),
    }
}

/// Reads the first worksheet of a workbook.
///
/// Trailing empty header cells, which spreadsheet tools leave behind after a
/// column is cleared, are dropped before the header checks.
pub fn read_excel(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::ExcelOpen {
        path: path.to_path_buf(),
        source,
    })?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|source| IngestError::ExcelSheet {
            path: path.to_path_buf(),
            sheet: sheet.clone(),
            source,
        })?;
    debug!(path = %path.display(), sheet = %sheet, "reading worksheet");

    let mut raw_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(excel_cell).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|value| !value.is_empty()))
        .collect();
    if let Some(header_row) = raw_rows.first_mut() {
        while header_row.last().is_some_and(String::is_empty) {
            header_row.pop();
        }
    }
    build_table(raw_rows, path)
}

/// Loads a CSV, TSV or TXT table, sniffing the delimiter from the header, or
/// the first worksheet of an Excel workbook.
pub fn read_table(path: &Path) -> Result<Table> {
    let format = TableFormat::from_path(path)?;
    if !path.is_file() {
        return Err(IngestError::FileNotFound {
            path: PathBuf::from(path),
        });
    }
    if format == TableFormat::Excel {
        let table = read_excel(path)?;
        debug!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.rows.len(),
            "table loaded"
        );
        return Ok(table);
    }
    let text = std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let delimiter = sniff_delimiter(&text).unwrap_or(format.fallback_delimiter());
    debug!(
        path = %path.display(),
        delimiter = %char::from(delimiter).escape_default(),
        "reading table"
    );
    let table = parse_table(&text, delimiter, path)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "table loaded"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_the_most_frequent_delimiter() {
        assert_eq!(sniff_delimiter("a,b,c\n1,2,3"), Some(b','));
        assert_eq!(sniff_delimiter("a\tb\tc"), Some(b'\t'));
        assert_eq!(sniff_delimiter("a;b;c,d"), Some(b';'));
        assert_eq!(sniff_delimiter("\n\na|b"), Some(b'|'));
        assert_eq!(sniff_delimiter("single"), None);
    }

    #[test]
    fn ignores_delimiters_inside_quotes() {
        assert_eq!(sniff_delimiter("\"a,b,c\"\tdepth\tsite"), Some(b'\t'));
    }

    #[test]
    fn ties_prefer_comma() {
        assert_eq!(sniff_delimiter("a,b\tc"), Some(b','));
    }

    #[test]
    fn pads_and_truncates_rows() {
        let table = parse_table("a,b,c\n1\n1,2,3,4\n", b',', Path::new("t.csv")).expect("parse");
        assert_eq!(table.rows, vec![vec!["1", "", ""], vec!["1", "2", "3"]]);
    }

    #[test]
    fn normalizes_headers() {
        let table = parse_table("\u{feff} sample  id ,site\n", b',', Path::new("t.csv")).expect("parse");
        assert_eq!(table.headers, vec!["sample id", "site"]);
        assert!(table.is_empty());
    }

    #[test]
    fn rejects_duplicate_and_empty_headers() {
        let err = parse_table("a,b,a\n", b',', Path::new("t.csv")).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateHeader { header, .. } if header == "a"));

        let err = parse_table("a,,c\n", b',', Path::new("t.csv")).unwrap_err();
        assert!(matches!(err, IngestError::EmptyHeader { position: 2, .. }));

        let err = parse_table("\n , \n", b',', Path::new("t.csv")).unwrap_err();
        assert!(matches!(err, IngestError::EmptyTable { .. }));
    }
}
