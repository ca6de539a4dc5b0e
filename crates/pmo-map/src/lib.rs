//! Field matching for PMO sections.
//!
//! Suggests which input column feeds each target field of a section, lets the
//! caller correct the suggestion, checks that no column is used twice, and
//! tracks a section through to the validated mapping handed to the
//! transformer.

#![deny(unsafe_code)]

pub mod additional;
pub mod engine;
pub mod error;
pub mod overrides;
pub mod score;
pub mod state;
pub mod utils;
pub mod validate;

pub use additional::{select_additional, select_by_name};
pub use engine::{
    DEFAULT_THRESHOLD, MappingEngine, MatchDetail, MatchOptions, MatchResult, MatchWarning,
    match_fields,
};
pub use error::{MappingError, Result};
pub use overrides::{OverrideOutcome, OverrideSet, apply_overrides, override_options};
pub use score::{Candidate, FuzzyScorer, MAX_SCORE, Scorer, best_candidate};
pub use state::{ReadinessIssue, RoundState, SectionMapping, SectionStage, SectionSummary};
pub use validate::{ValidationReport, validate};
