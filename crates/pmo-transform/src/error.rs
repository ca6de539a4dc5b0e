//! Error types for section transformation and document assembly.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// A mapped source column is not a header of the table.
    #[error("{section}: column '{column}' mapped to '{target}' is not in the table")]
    MissingColumn {
        section: String,
        target: String,
        column: String,
    },

    /// Two output columns would write the same record key.
    #[error("{section}: more than one column writes the key '{key}'")]
    DuplicateOutputKey { section: String, key: String },

    /// Two inputs provide the same section.
    #[error("section provided more than once: {section}")]
    DuplicateSection { section: String },

    /// A section the final document needs was not provided.
    #[error("required section missing from the final document: {section}")]
    MissingSection { section: String },

    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unsupported document format for {path}; expected .json or .toml")]
    UnsupportedFormat { path: PathBuf },

    #[error("{section} in {path} must be a table of fields or a list of tables")]
    InvalidInfoSection { section: String, path: PathBuf },

    /// A record lacks a field the combination needs.
    #[error("{section}: record {record} has no value for '{field}'")]
    MissingField {
        section: String,
        record: usize,
        field: String,
    },

    /// A library sample has two raw read counts.
    #[error("{section}: library sample '{sample}' appears more than once")]
    DuplicateSample { section: String, sample: String },

    /// Stage counts reference a library sample without a raw read count.
    #[error("read counts by stage reference library sample '{sample}' with no raw read count")]
    UnknownSample { sample: String },

    #[error("bioinformatics run name must not be empty")]
    EmptyRunName,
}

pub type Result<T> = std::result::Result<T, TransformError>;
