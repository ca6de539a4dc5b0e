//! Target-to-source field mappings.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Display text for [`MatchedField::NoMatch`].
pub const NO_MATCH_LABEL: &str = "no match";

/// The source column assigned to a target, or the explicit "no match" sentinel.
///
/// Serialized as the column name, or `null` for no match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum MatchedField {
    Source(String),
    NoMatch,
}

impl MatchedField {
    pub fn source(name: impl Into<String>) -> Self {
        MatchedField::Source(name.into())
    }

    pub fn as_source(&self) -> Option<&str> {
        match self {
            MatchedField::Source(name) => Some(name.as_str()),
            MatchedField::NoMatch => None,
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, MatchedField::NoMatch)
    }
}

impl fmt::Display for MatchedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchedField::Source(name) => f.write_str(name),
            MatchedField::NoMatch => f.write_str(NO_MATCH_LABEL),
        }
    }
}

impl From<Option<String>> for MatchedField {
    fn from(value: Option<String>) -> Self {
        value.map_or(MatchedField::NoMatch, MatchedField::Source)
    }
}

impl From<MatchedField> for Option<String> {
    fn from(value: MatchedField) -> Self {
        match value {
            MatchedField::Source(name) => Some(name),
            MatchedField::NoMatch => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub target: String,
    pub source: MatchedField,
}

/// Ordered mapping from every target of a schema to its assignment.
///
/// Entries keep the order in which targets were inserted, which for matcher
/// output is the schema's declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: Vec<MappingEntry>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the assignment for `target`, keeping its position if already present.
    pub fn insert(&mut self, target: impl Into<String>, source: MatchedField) {
        let target = target.into();
        if let Some(entry) = self.entries.iter_mut().find(|e| e.target == target) {
            entry.source = source;
        } else {
            self.entries.push(MappingEntry { target, source });
        }
    }

    pub fn get(&self, target: &str) -> Option<&MatchedField> {
        self.entries
            .iter()
            .find(|e| e.target == target)
            .map(|e| &e.source)
    }

    /// Source column for `target`; `None` for unknown targets and for no match.
    pub fn source_for(&self, target: &str) -> Option<&str> {
        self.get(target).and_then(MatchedField::as_source)
    }

    pub fn contains_target(&self, target: &str) -> bool {
        self.get(target).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatchedField)> {
        self.entries.iter().map(|e| (e.target.as_str(), &e.source))
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.target.as_str())
    }

    /// Real source columns currently assigned, in target order (may repeat).
    pub fn assigned_sources(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| e.source.as_source())
            .collect()
    }

    /// Targets currently mapped to no match.
    pub fn unresolved_targets(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.source.is_no_match())
            .map(|e| e.target.as_str())
            .collect()
    }

    pub fn resolved_count(&self) -> usize {
        self.entries.len() - self.unresolved_targets().len()
    }

    /// `source_fields` minus every real column in this mapping, order preserved.
    pub fn unused_fields(&self, source_fields: &[String]) -> Vec<String> {
        let used: BTreeSet<&str> = self.assigned_sources().into_iter().collect();
        let mut seen = BTreeSet::new();
        source_fields
            .iter()
            .filter(|field| !used.contains(field.as_str()))
            .filter(|field| seen.insert(field.as_str()))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(T, MatchedField)> for FieldMapping
where
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, MatchedField)>>(iter: I) -> Self {
        let mut mapping = FieldMapping::new();
        for (target, source) in iter {
            mapping.insert(target, source);
        }
        mapping
    }
}

/// The validated {required, optional, additional} triple for one section.
///
/// Built once a section is ready for transformation and never mutated
/// afterwards; redoing an earlier mapping step produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedSection {
    section: String,
    required: FieldMapping,
    optional: FieldMapping,
    additional: Vec<String>,
}

impl FinalizedSection {
    pub fn new(
        section: impl Into<String>,
        required: FieldMapping,
        optional: FieldMapping,
        additional: Vec<String>,
    ) -> Self {
        Self {
            section: section.into(),
            required,
            optional,
            additional,
        }
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn required(&self) -> &FieldMapping {
        &self.required
    }

    pub fn optional(&self) -> &FieldMapping {
        &self.optional
    }

    pub fn additional(&self) -> &[String] {
        &self.additional
    }

    /// Output key / source column pairs in emission order: required targets,
    /// resolved optional targets, then additional columns under their own name.
    pub fn output_columns(&self) -> Vec<(&str, &str)> {
        let mut columns = Vec::new();
        for (target, source) in self.required.iter().chain(self.optional.iter()) {
            if let Some(column) = source.as_source() {
                columns.push((target, column));
            }
        }
        for column in &self.additional {
            columns.push((column.as_str(), column.as_str()));
        }
        columns
    }
}
