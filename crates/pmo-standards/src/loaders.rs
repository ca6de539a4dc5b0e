//! Loading section schemas from TOML or JSON documents.

use std::path::Path;

use tracing::{debug, info};

use crate::catalog::{SchemaDocument, SectionCatalog};
use crate::error::{Result, StandardsError};
use crate::paths::schema_override_path;

/// Built-in section schema.
pub const DEFAULT_SECTIONS_TOML: &str = include_str!("../data/sections.toml");

const EMBEDDED_ORIGIN: &str = "<embedded>";

/// Parses a TOML schema document.
pub fn parse_sections_toml(text: &str, origin: &Path) -> Result<SectionCatalog> {
    let document: SchemaDocument = toml::from_str(text).map_err(|source| StandardsError::Toml {
        path: origin.to_path_buf(),
        source,
    })?;
    SectionCatalog::from_document(document, origin)
}

/// Parses a JSON schema document.
///
/// Accepts either `{"sections": [...]}` or a bare object keyed by section
/// name.
pub fn parse_sections_json(text: &str, origin: &Path) -> Result<SectionCatalog> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|source| StandardsError::Json {
            path: origin.to_path_buf(),
            source,
        })?;
    let parsed = if value.get("sections").is_some_and(serde_json::Value::is_array) {
        serde_json::from_value(value)
    } else {
        keyed_document(value)
    };
    let document = parsed.map_err(|source| StandardsError::Json {
        path: origin.to_path_buf(),
        source,
    })?;
    SectionCatalog::from_document(document, origin)
}

fn keyed_document(value: serde_json::Value) -> serde_json::Result<SchemaDocument> {
    let keyed: serde_json::Map<String, serde_json::Value> = serde_json::from_value(value)?;
    let mut sections = Vec::with_capacity(keyed.len());
    for (name, mut body) in keyed {
        if let Some(object) = body.as_object_mut() {
            object
                .entry("name")
                .or_insert_with(|| serde_json::Value::String(name.clone()));
        }
        sections.push(serde_json::from_value(body)?);
    }
    Ok(SchemaDocument {
        schema: None,
        sections,
    })
}

/// Loads a schema document, choosing the parser by file extension.
pub fn load_sections(path: &Path) -> Result<SectionCatalog> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let text = match extension.as_deref() {
        Some("toml" | "json") => {
            std::fs::read_to_string(path).map_err(|e| StandardsError::io(path, e))?
        }
        _ => {
            return Err(StandardsError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    let catalog = if extension.as_deref() == Some("json") {
        parse_sections_json(&text, path)?
    } else {
        parse_sections_toml(&text, path)?
    };
    debug!(path = %path.display(), sections = catalog.len(), "loaded section schema");
    Ok(catalog)
}

/// Loads `path` when given, otherwise the embedded schema.
pub fn load_sections_or_default(path: Option<&Path>) -> Result<SectionCatalog> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "using section schema override");
            load_sections(path)
        }
        None => parse_sections_toml(DEFAULT_SECTIONS_TOML, Path::new(EMBEDDED_ORIGIN)),
    }
}

/// Loads the schema named by `PMO_SCHEMA_PATH`, or the embedded one.
pub fn load_default_sections() -> Result<SectionCatalog> {
    load_sections_or_default(schema_override_path().as_deref())
}
