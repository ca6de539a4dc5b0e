use std::path::PathBuf;

use pmo_map::{ReadinessIssue, SectionStage, SectionSummary};
use serde::Serialize;

/// One line of the mapping table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappingRow {
    /// `required`, `optional` or `additional`.
    pub kind: &'static str,
    pub target: String,
    /// Column name, or the "no match" label.
    pub source: String,
    /// Matcher score for the suggested column; `None` when overridden or
    /// unmatched.
    pub score: Option<f64>,
    pub overridden: bool,
}

#[derive(Debug)]
pub struct MapResult {
    pub section: String,
    pub table: PathBuf,
    pub stage: SectionStage,
    pub rows: Vec<MappingRow>,
    pub warnings: Vec<String>,
    pub issues: Vec<ReadinessIssue>,
    pub unused: Vec<String>,
    pub summary: SectionSummary,
    /// Written section file, absent on dry runs and unready mappings.
    pub output: Option<PathBuf>,
    pub records: usize,
    pub skipped_rows: usize,
}

impl MapResult {
    pub fn is_ready(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug)]
pub struct MergeResult {
    pub output: PathBuf,
    /// Section name and record count, in document order.
    pub sections: Vec<(String, usize)>,
}

#[derive(Debug)]
pub struct ReadCountsResult {
    pub output: PathBuf,
    pub samples: usize,
    pub stage_rows: usize,
}
