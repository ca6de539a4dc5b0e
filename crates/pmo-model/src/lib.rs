//! Section schemas, field mappings and the finalized section handed to transformation.

pub mod error;
pub mod mapping;
pub mod schema;

pub use error::{ModelError, Result};
pub use mapping::{FieldMapping, FinalizedSection, MappingEntry, MatchedField, NO_MATCH_LABEL};
pub use schema::{FieldKind, SectionSchema, SynonymTable, TargetSchema};
