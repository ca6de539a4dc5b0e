//! Manual corrections applied on top of matcher output.

use pmo_model::{FieldKind, FieldMapping, MatchedField};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{MappingError, Result};
use crate::validate::{ValidationReport, validate};

/// Target -> chosen source, applied independently per target.
///
/// Setting the same target twice keeps the last choice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideSet {
    choices: Vec<(String, MatchedField)>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, target: impl Into<String>, choice: MatchedField) {
        let target = target.into();
        if let Some(existing) = self.choices.iter_mut().find(|(t, _)| *t == target) {
            existing.1 = choice;
        } else {
            self.choices.push((target, choice));
        }
    }

    #[must_use]
    pub fn select(mut self, target: impl Into<String>, source: impl Into<String>) -> Self {
        self.set(target, MatchedField::source(source));
        self
    }

    #[must_use]
    pub fn no_match(mut self, target: impl Into<String>) -> Self {
        self.set(target, MatchedField::NoMatch);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MatchedField)> {
        self.choices.iter().map(|(t, c)| (t.as_str(), c))
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

impl<T: Into<String>> FromIterator<(T, MatchedField)> for OverrideSet {
    fn from_iter<I: IntoIterator<Item = (T, MatchedField)>>(iter: I) -> Self {
        let mut set = OverrideSet::new();
        for (target, choice) in iter {
            set.set(target, choice);
        }
        set
    }
}

/// Mapping after overrides, with the recomputed leftovers and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverrideOutcome {
    pub mapping: FieldMapping,
    pub unused: Vec<String>,
    pub validation: ValidationReport,
    /// Targets whose assignment actually changed, in override order.
    pub changed: Vec<String>,
}

/// Selectable values for any target of a `kind` schema: every distinct source
/// field, plus "no match" first for optional schemas.
pub fn override_options(source_fields: &[String], kind: FieldKind) -> Vec<MatchedField> {
    let mut options = Vec::with_capacity(source_fields.len() + 1);
    if kind.allows_no_match() {
        options.push(MatchedField::NoMatch);
    }
    for field in source_fields {
        let option = MatchedField::source(field.as_str());
        if !options.contains(&option) {
            options.push(option);
        }
    }
    options
}

/// Applies `choices` to `current`.
///
/// Every choice is checked before any is applied, so a rejected set leaves
/// nothing half-done. Overrides never free or reassign other targets; picking
/// a column already used elsewhere produces a duplicate that shows up in
/// [`OverrideOutcome::validation`].
pub fn apply_overrides(
    current: &FieldMapping,
    source_fields: &[String],
    kind: FieldKind,
    choices: &OverrideSet,
) -> Result<OverrideOutcome> {
    for (target, choice) in choices.iter() {
        if !current.contains_target(target) {
            return Err(MappingError::UnknownTarget {
                kind,
                target: target.to_string(),
            });
        }
        match choice {
            MatchedField::NoMatch if !kind.allows_no_match() => {
                return Err(MappingError::NoMatchNotAllowed {
                    target: target.to_string(),
                });
            }
            MatchedField::Source(source) if !source_fields.contains(source) => {
                return Err(MappingError::UnknownSource {
                    target: target.to_string(),
                    source_field: source.clone(),
                });
            }
            _ => {}
        }
    }

    let mut mapping = current.clone();
    let mut changed = Vec::new();
    for (target, choice) in choices.iter() {
        if mapping.get(target) != Some(choice) {
            debug!(%kind, field = target, choice = %choice, "override applied");
            mapping.insert(target, choice.clone());
            changed.push(target.to_string());
        }
    }

    let unused = mapping.unused_fields(source_fields);
    let validation = validate(&mapping);
    if !validation.is_valid {
        for message in validation.messages() {
            warn!(%kind, "{message}");
        }
    }

    Ok(OverrideOutcome {
        mapping,
        unused,
        validation,
        changed,
    })
}
