//! Target schemas and synonym tables for PMO sections.
//!
//! A section (specimen info, panel info, ...) expects two ordered lists of
//! canonical field names: the required targets and the optional targets.
//! Each list carries its own synonym table of alternate spellings that the
//! matcher also considers.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Whether a target schema must be fully resolved or is best-effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Every target must receive a source column.
    Required,
    /// Targets are filled only when a candidate clears the threshold.
    Optional,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Required => "required",
            FieldKind::Optional => "optional",
        }
    }

    /// "no match" is a legal manual choice only for optional targets.
    pub fn allows_no_match(&self) -> bool {
        matches!(self, FieldKind::Optional)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered list of unique target field names.
///
/// Declaration order is significant: the matcher walks targets in this order,
/// so earlier targets win ties for a shared source column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TargetSchema {
    fields: Vec<String>,
}

impl TargetSchema {
    /// Builds a schema, rejecting empty and duplicate names.
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for field in fields {
            let field = field.into().trim().to_string();
            if field.is_empty() {
                return Err(ModelError::EmptyTarget);
            }
            if !seen.insert(field.clone()) {
                return Err(ModelError::DuplicateTarget(field));
            }
            out.push(field);
        }
        Ok(Self { fields: out })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }
}

impl TryFrom<Vec<String>> for TargetSchema {
    type Error = ModelError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TargetSchema> for Vec<String> {
    fn from(value: TargetSchema) -> Self {
        value.fields
    }
}

/// Alternate spellings per target field.
///
/// Keys are expected to be a subset of the matching [`TargetSchema`]; absent
/// keys mean "no synonyms". Keys that do not name a target are tolerated and
/// reported through [`SynonymTable::orphans`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds synonyms for a target, appending to any already declared.
    pub fn insert<I, S>(&mut self, target: impl Into<String>, synonyms: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.entries.entry(target.into()).or_default();
        for synonym in synonyms {
            let synonym = synonym.into();
            if !entry.contains(&synonym) {
                entry.push(synonym);
            }
        }
    }

    #[must_use]
    pub fn with<I, S>(mut self, target: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(target, synonyms);
        self
    }

    /// Synonyms declared for `target`, in declaration order.
    pub fn synonyms_for(&self, target: &str) -> &[String] {
        self.entries.get(target).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys that reference a target missing from `schema`.
    pub fn orphans<'a>(&'a self, schema: &TargetSchema) -> Vec<&'a str> {
        self.targets()
            .filter(|target| !schema.contains(target))
            .collect()
    }
}

impl<K, V, S> FromIterator<(K, V)> for SynonymTable
where
    K: Into<String>,
    V: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = SynonymTable::new();
        for (target, synonyms) in iter {
            table.insert(target, synonyms);
        }
        table
    }
}

/// Field lists for one PMO section, as supplied by the schema provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSchema {
    /// Section key in the final PMO document (e.g. `specimen_info`).
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: TargetSchema,
    #[serde(default, rename = "required_alternatives")]
    pub required_synonyms: SynonymTable,
    #[serde(default)]
    pub optional: TargetSchema,
    #[serde(default, rename = "optional_alternatives")]
    pub optional_synonyms: SynonymTable,
}

impl SectionSchema {
    pub fn new(name: impl Into<String>, required: TargetSchema, optional: TargetSchema) -> Self {
        Self {
            name: name.into(),
            required,
            optional,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_synonyms(mut self, kind: FieldKind, synonyms: SynonymTable) -> Self {
        match kind {
            FieldKind::Required => self.required_synonyms = synonyms,
            FieldKind::Optional => self.optional_synonyms = synonyms,
        }
        self
    }

    pub fn targets(&self, kind: FieldKind) -> &TargetSchema {
        match kind {
            FieldKind::Required => &self.required,
            FieldKind::Optional => &self.optional,
        }
    }

    pub fn synonyms(&self, kind: FieldKind) -> &SynonymTable {
        match kind {
            FieldKind::Required => &self.required_synonyms,
            FieldKind::Optional => &self.optional_synonyms,
        }
    }

    /// Targets declared in both the required and optional lists.
    pub fn overlapping_targets(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|target| self.optional.contains(target))
            .collect()
    }
}
