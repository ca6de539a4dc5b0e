use std::fs;
use std::path::{Path, PathBuf};

use pmo_ingest::{IngestError, TableFormat, read_table};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write table");
    path
}

#[test]
fn reads_comma_separated_specimens() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        &dir,
        "specimens.csv",
        "sample_id,collection_date,country\nS1,2021-03-02,Ghana\n\nS2,,Mali\n",
    );

    let table = read_table(&path).expect("read table");
    assert_eq!(table.headers, vec!["sample_id", "collection_date", "country"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cell(1, "collection_date"), Some(""));
    assert_eq!(table.cell(1, "country"), Some("Mali"));
    assert_eq!(table.cell(0, "missing"), None);
}

#[test]
fn sniffs_tabs_in_txt_files() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "mhap.txt", "sampleID\tlocus\tasv\treads\nS1\tt1\tACGT\t12\n");

    let table = read_table(&path).expect("read table");
    assert_eq!(table.headers, vec!["sampleID", "locus", "asv", "reads"]);
    assert_eq!(table.cell(0, "reads"), Some("12"));
}

#[test]
fn single_column_tsv_falls_back_to_tab() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "ids.tsv", "sample_id\nS1\nS2\n");

    let table = read_table(&path).expect("read table");
    assert_eq!(table.headers, vec!["sample_id"]);
    assert_eq!(table.row_count(), 2);
}

#[test]
fn quoted_cells_keep_embedded_delimiters() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "panel.csv", "target,notes\nt1,\"amplicon, long\"\n");

    let table = read_table(&path).expect("read table");
    assert_eq!(table.cell(0, "notes"), Some("amplicon, long"));
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn reads_first_worksheet_of_workbook() {
    let table = read_table(&fixture("specimens.xlsx")).expect("read workbook");
    assert_eq!(table.headers, vec!["Sample ID", "collection_date", "reads"]);
    // The blank third row is skipped; missing cells read as empty.
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.cell(0, "collection_date"), Some("2021-03-02"));
    assert_eq!(table.cell(0, "reads"), Some("12"));
    assert_eq!(table.cell(1, "Sample ID"), Some("S2"));
    assert_eq!(table.cell(1, "collection_date"), Some(""));
    assert_eq!(table.cell(1, "reads"), Some("7.5"));
}

#[test]
fn workbook_extensions_select_excel() {
    for name in ["a.xlsx", "a.XLSM", "a.xls", "a.ods"] {
        assert_eq!(TableFormat::from_path(Path::new(name)).expect(name), TableFormat::Excel);
    }
}

#[test]
fn corrupt_workbook_is_an_open_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "specimens.xlsx", "binary");
    let err = read_table(&path).unwrap_err();
    assert!(matches!(err, IngestError::ExcelOpen { .. }), "{err:?}");
    assert!(err.to_string().contains("specimens.xlsx"));
}

#[test]
fn rejects_unknown_extensions() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_table(&dir.path().join("notes.json")).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { ref extension, .. } if extension == "json"));
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let err = read_table(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn duplicate_headers_are_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(&dir, "dup.csv", "id,site,id\n1,a,2\n");
    let err = read_table(&path).unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("duplicate column name 'id' in {}", path.display())
    );
}
