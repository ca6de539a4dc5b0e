//! Loading of the tabular files uploaded for each PMO section.

pub mod error;
pub mod table;

pub use error::{IngestError, Result};
pub use table::{
    DELIMITERS, Table, TableFormat, parse_table, read_excel, read_table, sniff_delimiter,
};
