//! Final PMO document assembly.
//!
//! The document is a union of section fragments keyed by section name.
//! Sections entered by hand rather than mapped from a table (project,
//! sequencing and bioinformatics run information) come from small JSON or
//! TOML documents.

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::section::SectionDocument;

/// Sections every final document must contain.
///
/// `bioinfo_methods_list` may also be merged but is not required.
pub const REQUIRED_SECTIONS: [&str; 8] = [
    PROJECT_SECTION,
    "specimen_info",
    "library_sample_info",
    "seq_info",
    "panel_info",
    "mhap_info",
    "bioinfo_run_infos",
    READ_COUNTS_SECTION,
];

/// Section key used for project information.
pub const PROJECT_SECTION: &str = "project_info";

/// Section key of the combined read counts.
pub const READ_COUNTS_SECTION: &str = "read_counts_per_stage";

/// Merges sections into one document, requiring [`REQUIRED_SECTIONS`].
pub fn merge_sections(sections: &[SectionDocument]) -> Result<Value> {
    merge_sections_with(sections, &REQUIRED_SECTIONS)
}

/// Merges sections into one document keyed by section name, in input order.
///
/// Fails on a section provided twice or on a missing `required` section.
pub fn merge_sections_with(sections: &[SectionDocument], required: &[&str]) -> Result<Value> {
    let mut seen = BTreeSet::new();
    let mut document = Map::new();
    for section in sections {
        if !seen.insert(section.section.as_str()) {
            return Err(TransformError::DuplicateSection {
                section: section.section.clone(),
            });
        }
        debug!(section = %section.section, records = section.len(), "merging section");
        document.insert(section.section.clone(), section.records_value());
    }
    if let Some(missing) = required.iter().find(|name| !seen.contains(*name)) {
        return Err(TransformError::MissingSection {
            section: (*missing).to_string(),
        });
    }
    info!(sections = document.len(), "PMO document assembled");
    Ok(Value::Object(document))
}

/// Reads project information as a [`PROJECT_SECTION`] section.
pub fn load_project_info(path: &Path) -> Result<SectionDocument> {
    load_info_section(PROJECT_SECTION, path)
}

/// Reads a hand-written section from a JSON or TOML document.
///
/// A table of fields is one record. A JSON array of tables, or a TOML
/// document holding only a `records` array of tables, is one record per
/// table. Nested values are kept as JSON.
pub fn load_info_section(section: &str, path: &Path) -> Result<SectionDocument> {
    let text = std::fs::read_to_string(path).map_err(|source| TransformError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let value: Value = match extension.as_deref() {
        Some("json") => serde_json::from_str(&text).map_err(|source| TransformError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Some("toml") => {
            let mut table: toml::Table =
                toml::from_str(&text).map_err(|source| TransformError::Toml {
                    path: path.to_path_buf(),
                    source,
                })?;
            let value = match (table.len(), table.remove("records")) {
                (1, Some(records @ toml::Value::Array(_))) => records,
                (_, Some(other)) => {
                    table.insert("records".to_string(), other);
                    toml::Value::Table(table)
                }
                (_, None) => toml::Value::Table(table),
            };
            serde_json::to_value(value).map_err(|source| TransformError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => {
            return Err(TransformError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    let invalid = || TransformError::InvalidInfoSection {
        section: section.to_string(),
        path: path.to_path_buf(),
    };
    let records = match value {
        Value::Object(record) => vec![record],
        Value::Array(items) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                _ => Err(invalid()),
            })
            .collect::<Result<Vec<_>>>()?,
        _ => return Err(invalid()),
    };
    debug!(section, path = %path.display(), records = records.len(), "loaded info section");
    Ok(SectionDocument::new(section, records).with_source_file(path))
}
