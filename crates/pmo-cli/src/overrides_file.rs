//! Manual mapping corrections read from disk.
//!
//! ```toml
//! additional = ["collector"]
//!
//! [required]
//! specimen_name = "sample_id"
//!
//! [optional]
//! host_age = { no_match = true }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use pmo_map::OverrideSet;
use pmo_model::MatchedField;
use serde::Deserialize;

/// One manual choice: a column name, or `{ no_match = true }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OverrideChoice {
    Column(String),
    NoMatch { no_match: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverridesFile {
    #[serde(default)]
    pub required: BTreeMap<String, OverrideChoice>,
    #[serde(default)]
    pub optional: BTreeMap<String, OverrideChoice>,
    /// Additional columns to carry, merged with `--additional`.
    #[serde(default)]
    pub additional: Vec<String>,
}

impl OverridesFile {
    /// Reads a `.toml` or `.json` overrides document.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read overrides {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => toml::from_str(&text)
                .with_context(|| format!("parse overrides {}", path.display())),
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("parse overrides {}", path.display())),
            _ => bail!(
                "unsupported overrides format: {} (expected .toml or .json)",
                path.display()
            ),
        }
    }

    pub fn required_set(&self) -> Result<OverrideSet> {
        to_override_set(&self.required)
    }

    pub fn optional_set(&self) -> Result<OverrideSet> {
        to_override_set(&self.optional)
    }
}

fn to_override_set(choices: &BTreeMap<String, OverrideChoice>) -> Result<OverrideSet> {
    let mut set = OverrideSet::new();
    for (target, choice) in choices {
        let choice = match choice {
            OverrideChoice::Column(column) => MatchedField::source(column.clone()),
            OverrideChoice::NoMatch { no_match: true } => MatchedField::NoMatch,
            OverrideChoice::NoMatch { no_match: false } => {
                bail!("override for '{target}': no_match must be true or replaced by a column name")
            }
        };
        set.set(target.clone(), choice);
    }
    Ok(set)
}
