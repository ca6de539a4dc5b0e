#![deny(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StandardsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML schema {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse JSON schema {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported schema format for {path}; expected .toml or .json")]
    UnsupportedFormat { path: PathBuf },

    #[error("schema document defines no sections: {path}")]
    NoSections { path: PathBuf },

    #[error("section with an empty name in {path}")]
    EmptySectionName { path: PathBuf },

    #[error("duplicate section in {path}: {section}")]
    DuplicateSection { path: PathBuf, section: String },

    #[error("unknown section: {section} (available: {available})")]
    UnknownSection { section: String, available: String },
}

impl StandardsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StandardsError>;
