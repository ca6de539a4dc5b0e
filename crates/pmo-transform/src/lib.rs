//! PMO section transformation and document assembly.
//!
//! - **records**: table + finalized mapping -> section records
//! - **section**: the section fragment type and its JSON file form
//! - **read_counts**: raw and per-stage read counts -> `read_counts_per_stage`
//! - **merge**: union of section fragments into the final PMO document

pub mod error;
pub mod merge;
pub mod read_counts;
pub mod records;
pub mod section;

pub use error::{Result, TransformError};
pub use merge::{
    PROJECT_SECTION, READ_COUNTS_SECTION, REQUIRED_SECTIONS, load_info_section,
    load_project_info, merge_sections, merge_sections_with,
};
pub use read_counts::{RAW_COUNTS_SECTION, STAGE_COUNTS_SECTION, combine_read_counts};
pub use records::transform_section;
pub use section::{Record, SectionDocument, SectionMeta, write_json_value};
