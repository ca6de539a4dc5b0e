//! Table + finalized mapping -> section records.

use std::collections::BTreeSet;

use pmo_ingest::Table;
use pmo_model::FinalizedSection;
use serde_json::Value;
use tracing::{debug, info, info_span};

use crate::error::{Result, TransformError};
use crate::section::{Record, SectionDocument};

/// Builds one record per table row.
///
/// Keys follow [`FinalizedSection::output_columns`]: required targets, the
/// optional targets that resolved, then additional columns under their own
/// names. Empty cells are left out of the record. A row is skipped when all of
/// its required cells are empty (or, for a section without required targets,
/// when all of its output cells are).
pub fn transform_section(table: &Table, finalized: &FinalizedSection) -> Result<SectionDocument> {
    let span = info_span!("transform_section", section = finalized.section());
    let _guard = span.enter();

    let columns = finalized.output_columns();
    let mut keys = BTreeSet::new();
    let mut plan = Vec::with_capacity(columns.len());
    for (key, column) in &columns {
        if !keys.insert(*key) {
            return Err(TransformError::DuplicateOutputKey {
                section: finalized.section().to_string(),
                key: (*key).to_string(),
            });
        }
        let index = table
            .column_index(column)
            .ok_or_else(|| TransformError::MissingColumn {
                section: finalized.section().to_string(),
                target: (*key).to_string(),
                column: (*column).to_string(),
            })?;
        plan.push((*key, index));
    }

    let required_count = finalized.required().resolved_count();
    let mut records = Vec::with_capacity(table.row_count());
    let mut skipped = 0usize;
    for (row_idx, row) in table.rows.iter().enumerate() {
        let cell = |index: usize| row.get(index).map_or("", |value| value.trim());
        let gate = if required_count > 0 {
            &plan[..required_count]
        } else {
            &plan[..]
        };
        if gate.iter().all(|(_, index)| cell(*index).is_empty()) {
            debug!(row = row_idx + 1, "skipping row without required values");
            skipped += 1;
            continue;
        }

        let mut record = Record::new();
        for (key, index) in &plan {
            let value = cell(*index);
            if !value.is_empty() {
                record.insert((*key).to_string(), Value::String(value.to_string()));
            }
        }
        records.push(record);
    }

    info!(
        records = records.len(),
        skipped,
        columns = plan.len(),
        "section transformed"
    );
    let mut document = SectionDocument::new(finalized.section(), records);
    document.meta.skipped_rows = skipped;
    Ok(document)
}
