//! Greedy target-to-source matching.
//!
//! Targets are processed in schema order. Each target takes the best-scoring
//! column still in the pool, which is then removed, so earlier targets win
//! contested columns. Required targets always take their best candidate;
//! optional targets take it only when it reaches the threshold.

use std::collections::BTreeSet;
use std::fmt;

use pmo_model::{FieldKind, FieldMapping, MatchedField, SynonymTable, TargetSchema};
use serde::Serialize;
use tracing::{debug, debug_span, info, warn};

use crate::score::{FuzzyScorer, Scorer, best_candidate_for_names};

/// Minimum score an optional target needs to accept its best candidate.
pub const DEFAULT_THRESHOLD: f64 = 60.0;

/// Controls one matching round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    pub kind: FieldKind,
    /// Ignored for required rounds.
    pub threshold: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            kind: FieldKind::Required,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MatchOptions {
    #[must_use]
    pub fn required() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn optional(threshold: f64) -> Self {
        Self {
            kind: FieldKind::Optional,
            threshold,
        }
    }
}

/// Non-fatal conditions observed while matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MatchWarning {
    /// Fewer distinct source columns than required targets.
    InsufficientSourceFields { available: usize, required: usize },
    /// Synonym entry for a name that is not a target of the schema.
    OrphanSynonym { target: String },
}

impl fmt::Display for MatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientSourceFields {
                available,
                required,
            } => write!(
                f,
                "not enough unique source fields: {available} available for {required} required targets"
            ),
            Self::OrphanSynonym { target } => {
                write!(f, "synonyms declared for unknown target '{target}'")
            }
        }
    }
}

/// What the matcher considered for one target.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetail {
    pub target: String,
    /// Best column left in the pool, if any.
    pub candidate: Option<String>,
    /// Target name or synonym that produced the best score.
    pub matched_on: Option<String>,
    pub score: Option<f64>,
    pub accepted: bool,
}

/// Output of one matching round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub kind: FieldKind,
    /// One entry per target, in schema order.
    pub mapping: FieldMapping,
    /// Source fields not assigned by this round, in input order.
    pub unused: Vec<String>,
    pub warnings: Vec<MatchWarning>,
    pub details: Vec<MatchDetail>,
}

impl MatchResult {
    pub fn detail(&self, target: &str) -> Option<&MatchDetail> {
        self.details.iter().find(|d| d.target == target)
    }
}

/// Matches source fields against target schemas using a [`Scorer`].
#[derive(Debug, Clone, Default)]
pub struct MappingEngine<S = FuzzyScorer> {
    scorer: S,
}

impl MappingEngine<FuzzyScorer> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: Scorer> MappingEngine<S> {
    pub fn with_scorer(scorer: S) -> Self {
        Self { scorer }
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Runs one greedy matching round.
    ///
    /// Duplicate source names are collapsed to their first occurrence before
    /// matching. When the pool runs dry, remaining targets get
    /// [`MatchedField::NoMatch`].
    pub fn match_fields(
        &self,
        source_fields: &[String],
        schema: &TargetSchema,
        synonyms: Option<&SynonymTable>,
        options: MatchOptions,
    ) -> MatchResult {
        let span = debug_span!("match_fields", kind = %options.kind, targets = schema.len());
        let _guard = span.enter();

        let mut seen = BTreeSet::new();
        let mut pool: Vec<&str> = source_fields
            .iter()
            .map(String::as_str)
            .filter(|field| seen.insert(*field))
            .collect();

        let mut warnings = Vec::new();
        if let Some(table) = synonyms {
            for target in table.orphans(schema) {
                warn!(field = target, "synonyms declared for unknown target");
                warnings.push(MatchWarning::OrphanSynonym {
                    target: target.to_string(),
                });
            }
        }
        if options.kind == FieldKind::Required && pool.len() < schema.len() {
            warn!(
                available = pool.len(),
                required = schema.len(),
                "not enough unique source fields for required targets"
            );
            warnings.push(MatchWarning::InsufficientSourceFields {
                available: pool.len(),
                required: schema.len(),
            });
        }

        let mut mapping = FieldMapping::new();
        let mut details = Vec::with_capacity(schema.len());
        for target in schema.iter() {
            let alternates = synonyms.map(|t| t.synonyms_for(target)).unwrap_or_default();
            let names = std::iter::once(target).chain(
                alternates
                    .iter()
                    .map(String::as_str)
                    .filter(|name| !name.trim().is_empty()),
            );

            let Some(candidate) = best_candidate_for_names(&self.scorer, names, &pool) else {
                debug!(field = target, "source pool exhausted");
                mapping.insert(target, MatchedField::NoMatch);
                details.push(MatchDetail {
                    target: target.to_string(),
                    candidate: None,
                    matched_on: None,
                    score: None,
                    accepted: false,
                });
                continue;
            };

            let accepted =
                options.kind == FieldKind::Required || candidate.score >= options.threshold;
            debug!(
                field = target,
                source = candidate.source,
                matched_on = candidate.matched_on,
                score = candidate.score,
                accepted,
                "best candidate"
            );
            details.push(MatchDetail {
                target: target.to_string(),
                candidate: Some(candidate.source.to_string()),
                matched_on: Some(candidate.matched_on.to_string()),
                score: Some(candidate.score),
                accepted,
            });
            if accepted {
                mapping.insert(target, MatchedField::source(candidate.source));
                pool.remove(candidate.index);
            } else {
                mapping.insert(target, MatchedField::NoMatch);
            }
        }

        let unused = mapping.unused_fields(source_fields);
        info!(
            kind = %options.kind,
            matched = mapping.resolved_count(),
            targets = mapping.len(),
            unused = unused.len(),
            "matching round complete"
        );

        MatchResult {
            kind: options.kind,
            mapping,
            unused,
            warnings,
            details,
        }
    }
}

/// Matches with the default [`FuzzyScorer`].
pub fn match_fields(
    source_fields: &[String],
    schema: &TargetSchema,
    synonyms: Option<&SynonymTable>,
    options: MatchOptions,
) -> MatchResult {
    MappingEngine::new().match_fields(source_fields, schema, synonyms, options)
}
