//! Schema document path resolution.

use std::path::PathBuf;

/// Environment variable for overriding the embedded section schema.
pub const SCHEMA_ENV_VAR: &str = "PMO_SCHEMA_PATH";

/// Schema document named by `PMO_SCHEMA_PATH`, if set and non-empty.
pub fn schema_override_path() -> Option<PathBuf> {
    std::env::var_os(SCHEMA_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
