//! Error types for table loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an input table.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Table file not found.
    #[error("table file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is not a delimited text or workbook type.
    #[error(
        "unsupported table format '{extension}' for {path}; expected csv, tsv, txt, xlsx, xlsm, xls or ods"
    )]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Failed to parse delimited text.
    #[error("failed to parse {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Workbook could not be opened.
    #[error("failed to open workbook {path}: {source}")]
    ExcelOpen {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Worksheet could not be read.
    #[error("failed to read worksheet '{sheet}' in {path}: {source}")]
    ExcelSheet {
        path: PathBuf,
        sheet: String,
        #[source]
        source: calamine::Error,
    },

    /// Workbook has no worksheets.
    #[error("workbook has no worksheets: {path}")]
    EmptyWorkbook { path: PathBuf },

    /// File has no header line.
    #[error("table is empty: {path}")]
    EmptyTable { path: PathBuf },

    /// A header cell is blank.
    #[error("empty column name at position {position} in {path}")]
    EmptyHeader { path: PathBuf, position: usize },

    /// Two header cells share a name.
    #[error("duplicate column name '{header}' in {path}")]
    DuplicateHeader { path: PathBuf, header: String },
}

/// Result type for ingest operations.
pub type Result<T> = std::result::Result<T, IngestError>;
