use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("target field name must not be empty")]
    EmptyTarget,
    #[error("duplicate target field in schema: {0}")]
    DuplicateTarget(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
