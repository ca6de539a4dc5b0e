//! Transformed section fragments.
//!
//! A [`SectionDocument`] is the JSON fragment produced for one PMO section:
//! one record per input row, keyed by target field name. Documents are
//! written to disk between the `map` and `merge` steps.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TransformError};

/// One output record: target field name -> value.
pub type Record = Map<String, Value>;

/// Where a section's records came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionMeta {
    /// Input table the records were built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<PathBuf>,
    /// Input rows dropped because every required cell was empty.
    #[serde(default)]
    pub skipped_rows: usize,
}

/// Records for one PMO section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDocument {
    /// Section key in the final document (e.g. `panel_info`).
    pub section: String,
    pub records: Vec<Record>,
    #[serde(default)]
    pub meta: SectionMeta,
}

impl SectionDocument {
    pub fn new(section: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            section: section.into(),
            records,
            meta: SectionMeta::default(),
        }
    }

    #[must_use]
    pub fn with_source_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.meta.source_file = Some(path.into());
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The records as a JSON array, the section's value in the final document.
    pub fn records_value(&self) -> Value {
        Value::Array(self.records.iter().cloned().map(Value::Object).collect())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| TransformError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| TransformError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        write_json_value(path, self)
    }
}

/// Pretty-prints `value` to `path`, creating parent directories.
pub fn write_json_value<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|source| TransformError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| TransformError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, text + "\n").map_err(|source| TransformError::Write {
        path: path.to_path_buf(),
        source,
    })
}
