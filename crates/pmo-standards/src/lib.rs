//! Section schemas for the PMO builder: which target fields each section
//! expects, their alternate spellings, and diagnostics for malformed schemas.

#![deny(unsafe_code)]

pub mod catalog;
pub mod check;
pub mod error;
pub mod loaders;
pub mod paths;

pub use crate::catalog::{SchemaDocument, SchemaHeader, SectionCatalog};
pub use crate::check::{SchemaIssue, SchemaReport, check_sections};
pub use crate::error::{Result, StandardsError};
pub use crate::loaders::{
    DEFAULT_SECTIONS_TOML, load_default_sections, load_sections, load_sections_or_default,
    parse_sections_json, parse_sections_toml,
};
pub use crate::paths::{SCHEMA_ENV_VAR, schema_override_path};
