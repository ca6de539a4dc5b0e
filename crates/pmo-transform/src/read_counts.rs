//! Read counts per stage.
//!
//! Read counts are mapped from two tables: the raw read count of each
//! library sample, and the reads kept for each sample and target at every
//! bioinformatics stage. [`combine_read_counts`] nests the second under the
//! first and tags the result with the bioinformatics run it came from.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::merge::READ_COUNTS_SECTION;
use crate::section::{Record, SectionDocument};

/// Catalog section of the raw read count table.
pub const RAW_COUNTS_SECTION: &str = "read_counts_raw";

/// Catalog section of the per-stage read count table.
pub const STAGE_COUNTS_SECTION: &str = "read_counts_by_stage";

const SAMPLE_FIELD: &str = "library_sample_name";
const RAW_COUNT_FIELD: &str = "raw_read_count";
const TARGET_FIELD: &str = "target_name";
const STAGE_FIELD: &str = "stage";
const READ_COUNT_FIELD: &str = "read_count";

struct SampleCounts {
    record: Record,
    targets: Vec<(String, Vec<Value>)>,
}

impl SampleCounts {
    fn push_stage(&mut self, target: String, stage: Record) {
        match self.targets.iter_mut().find(|(name, _)| *name == target) {
            Some((_, stages)) => stages.push(Value::Object(stage)),
            None => self.targets.push((target, vec![Value::Object(stage)])),
        }
    }

    fn into_value(self) -> Value {
        let mut record = self.record;
        let targets = self
            .targets
            .into_iter()
            .map(|(target, stages)| {
                let mut entry = Map::new();
                entry.insert(TARGET_FIELD.to_string(), Value::String(target));
                entry.insert("stages".to_string(), Value::Array(stages));
                Value::Object(entry)
            })
            .collect();
        record.insert("read_counts_for_targets".to_string(), Value::Array(targets));
        Value::Object(record)
    }
}

/// Builds the one-record [`READ_COUNTS_SECTION`] from the raw and per-stage
/// read count sections.
///
/// Samples keep the order of `raw`; targets and stages keep the order of
/// `by_stage`. Fields beyond the required ones are carried along. Counts that
/// parse as whole numbers become JSON numbers.
pub fn combine_read_counts(
    raw: &SectionDocument,
    by_stage: &SectionDocument,
    run_name: &str,
) -> Result<SectionDocument> {
    let run_name = run_name.trim();
    if run_name.is_empty() {
        return Err(TransformError::EmptyRunName);
    }

    let mut samples: Vec<SampleCounts> = Vec::with_capacity(raw.len());
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    for (position, row) in raw.records.iter().enumerate() {
        let sample = text_field(raw, position, row, SAMPLE_FIELD)?;
        let count = required_field(raw, position, row, RAW_COUNT_FIELD)?;
        if index.contains_key(&sample) {
            return Err(TransformError::DuplicateSample {
                section: raw.section.clone(),
                sample,
            });
        }
        let mut record = Map::new();
        record.insert(SAMPLE_FIELD.to_string(), Value::String(sample.clone()));
        record.insert(RAW_COUNT_FIELD.to_string(), count_value(count));
        copy_extra_fields(&mut record, row, &[SAMPLE_FIELD, RAW_COUNT_FIELD]);
        index.insert(sample, samples.len());
        samples.push(SampleCounts {
            record,
            targets: Vec::new(),
        });
    }

    for (position, row) in by_stage.records.iter().enumerate() {
        let sample = text_field(by_stage, position, row, SAMPLE_FIELD)?;
        let target = text_field(by_stage, position, row, TARGET_FIELD)?;
        let stage = required_field(by_stage, position, row, STAGE_FIELD)?;
        let count = required_field(by_stage, position, row, READ_COUNT_FIELD)?;
        let Some(slot) = index.get(&sample).copied() else {
            return Err(TransformError::UnknownSample { sample });
        };
        let mut entry = Map::new();
        entry.insert(STAGE_FIELD.to_string(), stage.clone());
        entry.insert(READ_COUNT_FIELD.to_string(), count_value(count));
        copy_extra_fields(
            &mut entry,
            row,
            &[SAMPLE_FIELD, TARGET_FIELD, STAGE_FIELD, READ_COUNT_FIELD],
        );
        samples[slot].push_stage(target, entry);
    }

    let without_stages = samples.iter().filter(|s| s.targets.is_empty()).count();
    if without_stages > 0 {
        debug!(samples = without_stages, "library samples without stage counts");
    }
    info!(
        run = run_name,
        samples = samples.len(),
        stage_rows = by_stage.len(),
        "read counts combined"
    );

    let mut record = Map::new();
    record.insert(
        "bioinformatics_run_name".to_string(),
        Value::String(run_name.to_string()),
    );
    record.insert(
        "read_counts_by_library_sample_by_stage".to_string(),
        Value::Array(samples.into_iter().map(SampleCounts::into_value).collect()),
    );
    Ok(SectionDocument::new(READ_COUNTS_SECTION, vec![record]))
}

fn required_field<'a>(
    document: &SectionDocument,
    position: usize,
    row: &'a Record,
    field: &str,
) -> Result<&'a Value> {
    match row.get(field) {
        Some(Value::Null) | None => Err(TransformError::MissingField {
            section: document.section.clone(),
            record: position + 1,
            field: field.to_string(),
        }),
        Some(Value::String(text)) if text.trim().is_empty() => Err(TransformError::MissingField {
            section: document.section.clone(),
            record: position + 1,
            field: field.to_string(),
        }),
        Some(value) => Ok(value),
    }
}

fn text_field(
    document: &SectionDocument,
    position: usize,
    row: &Record,
    field: &str,
) -> Result<String> {
    Ok(match required_field(document, position, row, field)? {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    })
}

fn count_value(value: &Value) -> Value {
    match value {
        Value::String(text) => text
            .trim()
            .parse::<u64>()
            .map_or_else(|_| value.clone(), Value::from),
        other => other.clone(),
    }
}

fn copy_extra_fields(target: &mut Record, row: &Record, skip: &[&str]) {
    for (key, value) in row {
        if !skip.contains(&key.as_str()) {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn counts_become_numbers_when_whole() {
        assert_eq!(count_value(&json!("12")), json!(12));
        assert_eq!(count_value(&json!(" 7 ")), json!(7));
        assert_eq!(count_value(&json!("12.5")), json!("12.5"));
        assert_eq!(count_value(&json!(3)), json!(3));
    }

    #[test]
    fn blank_strings_count_as_missing() {
        let document = SectionDocument::new(RAW_COUNTS_SECTION, Vec::new());
        let mut row = Record::new();
        row.insert(SAMPLE_FIELD.to_string(), json!("  "));
        let err = text_field(&document, 0, &row, SAMPLE_FIELD).unwrap_err();
        assert_eq!(
            err.to_string(),
            "read_counts_raw: record 1 has no value for 'library_sample_name'"
        );
    }
}
