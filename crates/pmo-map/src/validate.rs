//! Duplicate-assignment checks on a field mapping.

use std::collections::{BTreeMap, BTreeSet};

use pmo_model::{FieldKind, FieldMapping};
use serde::Serialize;

use crate::error::MappingError;

/// Outcome of [`validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    /// Source columns assigned to two or more targets.
    pub duplicate_sources: BTreeSet<String>,
    /// Per duplicated source, the targets sharing it in mapping order.
    pub collisions: BTreeMap<String, Vec<String>>,
}

impl ValidationReport {
    /// One line per duplicated source, for display.
    pub fn messages(&self) -> Vec<String> {
        self.collisions
            .iter()
            .map(|(source, targets)| {
                format!(
                    "column '{source}' is assigned to several targets: {}",
                    targets.join(", ")
                )
            })
            .collect()
    }

    pub fn into_result(self, kind: FieldKind) -> Result<(), MappingError> {
        if self.is_valid {
            return Ok(());
        }
        Err(MappingError::DuplicateMapping {
            kind,
            collisions: self.collisions.into_iter().collect(),
        })
    }
}

/// Checks that no real source column is assigned to more than one target.
///
/// [`MatchedField::NoMatch`](pmo_model::MatchedField::NoMatch) never collides.
pub fn validate(mapping: &FieldMapping) -> ValidationReport {
    let mut by_source: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (target, source) in mapping.iter() {
        if let Some(source) = source.as_source() {
            by_source.entry(source).or_default().push(target);
        }
    }

    let collisions: BTreeMap<String, Vec<String>> = by_source
        .into_iter()
        .filter(|(_, targets)| targets.len() > 1)
        .map(|(source, targets)| {
            (
                source.to_string(),
                targets.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();

    ValidationReport {
        is_valid: collisions.is_empty(),
        duplicate_sources: collisions.keys().cloned().collect(),
        collisions,
    }
}

#[cfg(test)]
mod tests {
    use pmo_model::MatchedField;

    use super::*;

    #[test]
    fn reports_each_duplicate_once() {
        let mapping: FieldMapping = [
            ("target1", MatchedField::source("f1")),
            ("target2", MatchedField::source("f1")),
            ("target3", MatchedField::source("f2")),
        ]
        .into_iter()
        .collect();

        let report = validate(&mapping);
        assert!(!report.is_valid);
        assert_eq!(report.duplicate_sources.len(), 1);
        assert_eq!(
            report.collisions.get("f1"),
            Some(&vec!["target1".to_string(), "target2".to_string()])
        );
        assert_eq!(report.messages().len(), 1);
    }

    #[test]
    fn no_match_never_collides() {
        let mapping: FieldMapping = [
            ("a", MatchedField::NoMatch),
            ("b", MatchedField::NoMatch),
            ("c", MatchedField::source("f1")),
        ]
        .into_iter()
        .collect();

        let report = validate(&mapping);
        assert!(report.is_valid);
        assert!(report.into_result(FieldKind::Optional).is_ok());
    }

    #[test]
    fn invalid_report_converts_to_error() {
        let mapping: FieldMapping = [
            ("a", MatchedField::source("x")),
            ("b", MatchedField::source("x")),
        ]
        .into_iter()
        .collect();

        let err = validate(&mapping)
            .into_result(FieldKind::Required)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "required mapping assigns a column more than once: 'x' -> a, b"
        );
    }
}
