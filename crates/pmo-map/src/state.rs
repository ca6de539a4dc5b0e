//! Mapping workflow state for one PMO section.
//!
//! A section moves through: required matching, optional overrides and
//! matching, additional-field selection, and finally readiness for
//! transformation. Redoing an earlier step discards everything after it, so
//! stale optional or additional selections never survive a required change.

use std::collections::BTreeSet;
use std::fmt;

use pmo_model::{FieldKind, FieldMapping, FinalizedSection, SectionSchema};
use serde::Serialize;
use tracing::{debug, info};

use crate::additional::select_by_name;
use crate::engine::{MappingEngine, MatchOptions, MatchResult};
use crate::error::{MappingError, Result};
use crate::overrides::{OverrideSet, apply_overrides};
use crate::score::{FuzzyScorer, Scorer};
use crate::validate::{ValidationReport, validate};

/// Where a section currently is in the mapping workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStage {
    Unmatched,
    RequiredMatched,
    OptionalMatched,
    AdditionalSelected,
    ReadyForTransform,
}

impl SectionStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unmatched => "unmatched",
            Self::RequiredMatched => "required matched",
            Self::OptionalMatched => "optional matched",
            Self::AdditionalSelected => "additional selected",
            Self::ReadyForTransform => "ready for transform",
        }
    }
}

impl fmt::Display for SectionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One matching round plus any overrides applied on top of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundState {
    /// Matcher output, untouched by overrides.
    pub suggestion: MatchResult,
    /// Current mapping (suggestion with overrides applied).
    pub mapping: FieldMapping,
    /// Fields of this round's pool not used by `mapping`.
    pub unused: Vec<String>,
    pub validation: ValidationReport,
    /// Whether any override changed the suggestion.
    pub overridden: bool,
}

impl RoundState {
    fn from_match(suggestion: MatchResult) -> Self {
        let validation = validate(&suggestion.mapping);
        Self {
            mapping: suggestion.mapping.clone(),
            unused: suggestion.unused.clone(),
            validation,
            overridden: false,
            suggestion,
        }
    }
}

/// Reasons a section cannot be finalized yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ReadinessIssue {
    RequiredNotMatched,
    OptionalNotMatched,
    AdditionalNotSelected,
    DuplicateSources { kind: FieldKind, sources: Vec<String> },
    UnresolvedRequired { targets: Vec<String> },
    /// Additional columns named like a mapped target; both would write the
    /// same record key.
    AdditionalShadowsTarget { columns: Vec<String> },
}

impl fmt::Display for ReadinessIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequiredNotMatched => f.write_str("required fields have not been matched"),
            Self::OptionalNotMatched => f.write_str("optional fields have not been matched"),
            Self::AdditionalNotSelected => f.write_str("additional fields have not been selected"),
            Self::DuplicateSources { kind, sources } => write!(
                f,
                "{kind} mapping uses columns more than once: {}",
                sources.join(", ")
            ),
            Self::UnresolvedRequired { targets } => write!(
                f,
                "required targets without a source column: {}",
                targets.join(", ")
            ),
            Self::AdditionalShadowsTarget { columns } => write!(
                f,
                "additional columns share a name with a mapped target: {}",
                columns.join(", ")
            ),
        }
    }
}

/// Counts for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub required_total: usize,
    pub required_mapped: usize,
    pub optional_total: usize,
    pub optional_mapped: usize,
    pub additional: usize,
    pub unused: usize,
}

/// Mapping workflow for one section over one input table.
#[derive(Debug, Clone)]
pub struct SectionMapping<S = FuzzyScorer> {
    schema: SectionSchema,
    source_fields: Vec<String>,
    engine: MappingEngine<S>,
    required: Option<RoundState>,
    optional: Option<RoundState>,
    additional: Option<Vec<String>>,
}

impl SectionMapping<FuzzyScorer> {
    pub fn new(schema: SectionSchema, source_fields: Vec<String>) -> Self {
        Self::with_engine(schema, source_fields, MappingEngine::new())
    }
}

impl<S: Scorer> SectionMapping<S> {
    pub fn with_engine(
        schema: SectionSchema,
        source_fields: Vec<String>,
        engine: MappingEngine<S>,
    ) -> Self {
        Self {
            schema,
            source_fields,
            engine,
            required: None,
            optional: None,
            additional: None,
        }
    }

    pub fn schema(&self) -> &SectionSchema {
        &self.schema
    }

    pub fn source_fields(&self) -> &[String] {
        &self.source_fields
    }

    pub fn required(&self) -> Option<&RoundState> {
        self.required.as_ref()
    }

    pub fn optional(&self) -> Option<&RoundState> {
        self.optional.as_ref()
    }

    pub fn additional(&self) -> Option<&[String]> {
        self.additional.as_deref()
    }

    /// Columns the optional round draws from: leftovers of the required round.
    pub fn optional_pool(&self) -> Option<&[String]> {
        self.required.as_ref().map(|round| round.unused.as_slice())
    }

    /// Columns still unassigned after the latest completed round.
    pub fn unused_fields(&self) -> &[String] {
        match (&self.optional, &self.required) {
            (Some(round), _) | (None, Some(round)) => &round.unused,
            (None, None) => &self.source_fields,
        }
    }

    pub fn stage(&self) -> SectionStage {
        if self.required.is_none() {
            SectionStage::Unmatched
        } else if self.optional.is_none() {
            SectionStage::RequiredMatched
        } else if self.additional.is_none() {
            SectionStage::OptionalMatched
        } else if self.readiness().is_empty() {
            SectionStage::ReadyForTransform
        } else {
            SectionStage::AdditionalSelected
        }
    }

    /// Runs the required round over all source fields.
    pub fn match_required(&mut self) -> &RoundState {
        let result = self.engine.match_fields(
            &self.source_fields,
            &self.schema.required,
            Some(&self.schema.required_synonyms),
            MatchOptions::required(),
        );
        self.reset_after_required();
        self.required.insert(RoundState::from_match(result))
    }

    /// Applies manual choices to the required mapping.
    pub fn override_required(&mut self, choices: &OverrideSet) -> Result<&RoundState> {
        let Some(round) = self.required.as_mut() else {
            return Err(MappingError::StepOutOfOrder {
                step: "override required fields",
                requires: "matching required fields",
            });
        };
        let outcome = apply_overrides(
            &round.mapping,
            &self.source_fields,
            FieldKind::Required,
            choices,
        )?;
        if !outcome.changed.is_empty() {
            round.mapping = outcome.mapping;
            round.unused = outcome.unused;
            round.validation = outcome.validation;
            round.overridden = true;
            self.optional = None;
            self.additional = None;
        }
        Ok(round)
    }

    /// Runs the optional round over the required round's leftovers.
    pub fn match_optional(&mut self, threshold: f64) -> Result<&RoundState> {
        let Some(pool) = self.optional_pool() else {
            return Err(MappingError::StepOutOfOrder {
                step: "match optional fields",
                requires: "matching required fields",
            });
        };
        let result = self.engine.match_fields(
            pool,
            &self.schema.optional,
            Some(&self.schema.optional_synonyms),
            MatchOptions::optional(threshold),
        );
        self.additional = None;
        Ok(self.optional.insert(RoundState::from_match(result)))
    }

    /// Applies manual choices to the optional mapping.
    ///
    /// Choices are limited to the required round's leftovers, the same pool
    /// the optional round matched from. A column already assigned to a
    /// required target is rejected with [`MappingError::UnknownSource`]; to
    /// move it, override the required round first.
    pub fn override_optional(&mut self, choices: &OverrideSet) -> Result<&RoundState> {
        let pool = self.optional_pool().map(<[String]>::to_vec);
        let (Some(pool), Some(round)) = (pool, self.optional.as_mut()) else {
            return Err(MappingError::StepOutOfOrder {
                step: "override optional fields",
                requires: "matching optional fields",
            });
        };
        let outcome = apply_overrides(&round.mapping, &pool, FieldKind::Optional, choices)?;
        if !outcome.changed.is_empty() {
            round.mapping = outcome.mapping;
            round.unused = outcome.unused;
            round.validation = outcome.validation;
            round.overridden = true;
            self.additional = None;
        }
        Ok(round)
    }

    /// Records the chosen additional columns, keeping only current leftovers.
    pub fn select_additional<N: AsRef<str>>(&mut self, names: &[N]) -> Result<&[String]> {
        let Some(round) = self.optional.as_ref() else {
            return Err(MappingError::StepOutOfOrder {
                step: "select additional fields",
                requires: "matching optional fields",
            });
        };
        let selected = select_by_name(&round.unused, names);
        debug!(section = %self.schema.name, selected = selected.len(), "additional fields selected");
        Ok(self.additional.insert(selected).as_slice())
    }

    /// Everything blocking [`finalize`](Self::finalize); empty when ready.
    pub fn readiness(&self) -> Vec<ReadinessIssue> {
        let mut issues = Vec::new();
        let Some(required) = &self.required else {
            issues.push(ReadinessIssue::RequiredNotMatched);
            return issues;
        };
        if !required.validation.is_valid {
            issues.push(ReadinessIssue::DuplicateSources {
                kind: FieldKind::Required,
                sources: required.validation.duplicate_sources.iter().cloned().collect(),
            });
        }
        let unresolved = required.mapping.unresolved_targets();
        if !unresolved.is_empty() {
            issues.push(ReadinessIssue::UnresolvedRequired {
                targets: unresolved.into_iter().map(str::to_string).collect(),
            });
        }
        match &self.optional {
            None => issues.push(ReadinessIssue::OptionalNotMatched),
            Some(optional) if !optional.validation.is_valid => {
                issues.push(ReadinessIssue::DuplicateSources {
                    kind: FieldKind::Optional,
                    sources: optional.validation.duplicate_sources.iter().cloned().collect(),
                });
            }
            Some(_) => {}
        }
        if self.optional.is_some() && self.additional.is_none() {
            issues.push(ReadinessIssue::AdditionalNotSelected);
        }
        let columns = self.shadowed_targets();
        if !columns.is_empty() {
            issues.push(ReadinessIssue::AdditionalShadowsTarget { columns });
        }
        issues
    }

    pub fn is_ready(&self) -> bool {
        self.readiness().is_empty()
    }

    /// Produces the validated triple for transformation.
    pub fn finalize(&self) -> Result<FinalizedSection> {
        let (Some(required), Some(optional), Some(additional)) =
            (&self.required, &self.optional, &self.additional)
        else {
            return Err(MappingError::StepOutOfOrder {
                step: "finalize the section",
                requires: "completing every mapping step",
            });
        };
        required.validation.clone().into_result(FieldKind::Required)?;
        optional.validation.clone().into_result(FieldKind::Optional)?;
        let unresolved = required.mapping.unresolved_targets();
        if !unresolved.is_empty() {
            return Err(MappingError::UnresolvedRequired {
                targets: unresolved.into_iter().map(str::to_string).collect(),
            });
        }
        let columns = self.shadowed_targets();
        if !columns.is_empty() {
            return Err(MappingError::AdditionalShadowsTarget { columns });
        }

        info!(section = %self.schema.name, "section ready for transform");
        Ok(FinalizedSection::new(
            self.schema.name.clone(),
            required.mapping.clone(),
            optional.mapping.clone(),
            additional.clone(),
        ))
    }

    pub fn summary(&self) -> SectionSummary {
        SectionSummary {
            required_total: self.schema.required.len(),
            required_mapped: self
                .required
                .as_ref()
                .map_or(0, |round| round.mapping.resolved_count()),
            optional_total: self.schema.optional.len(),
            optional_mapped: self
                .optional
                .as_ref()
                .map_or(0, |round| round.mapping.resolved_count()),
            additional: self.additional.as_ref().map_or(0, Vec::len),
            unused: self.unused_fields().len(),
        }
    }

    /// Selected additional columns whose name is a resolved target.
    fn shadowed_targets(&self) -> Vec<String> {
        let Some(additional) = &self.additional else {
            return Vec::new();
        };
        let resolved: BTreeSet<&str> = [&self.required, &self.optional]
            .into_iter()
            .flatten()
            .flat_map(|round| round.mapping.iter())
            .filter(|(_, source)| source.as_source().is_some())
            .map(|(target, _)| target)
            .collect();
        additional
            .iter()
            .filter(|column| resolved.contains(column.as_str()))
            .cloned()
            .collect()
    }

    fn reset_after_required(&mut self) {
        self.optional = None;
        self.additional = None;
    }
}
