//! Error types for mapping operations.

use pmo_model::FieldKind;
use thiserror::Error;

/// Errors from override, validation and finalization steps.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// Override names a target outside the schema.
    #[error("unknown {kind} target: {target}")]
    UnknownTarget { kind: FieldKind, target: String },
    /// Override picks a column that is not in the selectable pool.
    #[error("column '{source_field}' is not available for target '{target}'")]
    UnknownSource { target: String, source_field: String },
    /// "no match" chosen for a required target.
    #[error("required target '{target}' cannot be set to no match")]
    NoMatchNotAllowed { target: String },
    /// Some source column is assigned to more than one target.
    #[error("{kind} mapping assigns a column more than once: {}", format_collisions(.collisions))]
    DuplicateMapping {
        kind: FieldKind,
        collisions: Vec<(String, Vec<String>)>,
    },
    /// Required targets left without a source column.
    #[error("required targets without a source column: {}", .targets.join(", "))]
    UnresolvedRequired { targets: Vec<String> },
    /// Additional columns would overwrite mapped targets in the output.
    #[error("additional columns share a name with a mapped target: {}", .columns.join(", "))]
    AdditionalShadowsTarget { columns: Vec<String> },
    /// A workflow step was requested before the step it depends on.
    #[error("cannot {step} before {requires}")]
    StepOutOfOrder {
        step: &'static str,
        requires: &'static str,
    },
}

fn format_collisions(collisions: &[(String, Vec<String>)]) -> String {
    collisions
        .iter()
        .map(|(source, targets)| format!("'{source}' -> {}", targets.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, MappingError>;
