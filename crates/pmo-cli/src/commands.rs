use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span, warn};

use pmo_ingest::read_table;
use pmo_map::SectionMapping;
use pmo_standards::{
    SectionCatalog, check_sections, load_default_sections, load_sections_or_default,
};
use pmo_transform::{
    READ_COUNTS_SECTION, SectionDocument, combine_read_counts, load_info_section,
    load_project_info, merge_sections, write_json_value,
};

use crate::cli::{MapArgs, MergeArgs, ReadCountsArgs};
use crate::overrides_file::OverridesFile;
use crate::summary::{mapping_rows, print_sections};
use crate::types::{MapResult, MergeResult, ReadCountsResult};

/// `--schema` when given, then `PMO_SCHEMA_PATH`, then the built-in schema.
pub fn load_catalog(schema: Option<&Path>) -> Result<SectionCatalog> {
    let catalog = match schema {
        Some(path) => load_sections_or_default(Some(path)),
        None => load_default_sections(),
    };
    catalog.context("load section schema")
}

pub fn run_sections(schema: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(schema)?;
    let report = check_sections(&catalog);
    print_sections(&catalog, &report);
    Ok(())
}

pub fn run_map(args: &MapArgs, schema: Option<&Path>) -> Result<MapResult> {
    let span = info_span!("map", section = %args.section);
    let _guard = span.enter();
    let start = Instant::now();

    let catalog = load_catalog(schema)?;
    let section_schema = catalog.section(&args.section)?.clone();
    let table = read_table(&args.table).context("read input table")?;
    let overrides = match &args.overrides {
        Some(path) => OverridesFile::load(path)?,
        None => OverridesFile::default(),
    };

    let mut section = SectionMapping::new(section_schema, table.headers.clone());

    section.match_required();
    let required_choices = overrides.required_set()?;
    if !required_choices.is_empty() {
        section
            .override_required(&required_choices)
            .context("apply required overrides")?;
    }

    section.match_optional(args.threshold)?;
    let optional_choices = overrides.optional_set()?;
    if !optional_choices.is_empty() {
        section
            .override_optional(&optional_choices)
            .context("apply optional overrides")?;
    }

    let additional = if args.all_additional {
        section
            .optional()
            .map(|round| round.unused.clone())
            .unwrap_or_default()
    } else {
        let mut names = args.additional.clone();
        names.extend(overrides.additional.iter().cloned());
        names
    };
    section.select_additional(additional.as_slice())?;

    let mut result = MapResult {
        section: args.section.clone(),
        table: args.table.clone(),
        stage: section.stage(),
        rows: mapping_rows(&section),
        warnings: collect_warnings(&section),
        issues: section.readiness(),
        unused: section.unused_fields().to_vec(),
        summary: section.summary(),
        output: None,
        records: 0,
        skipped_rows: 0,
    };
    if !result.is_ready() {
        warn!(issues = result.issues.len(), "mapping is not ready");
        return Ok(result);
    }

    let finalized = section.finalize()?;
    let document = pmo_transform::transform_section(&table, &finalized)
        .context("transform section")?
        .with_source_file(&args.table);
    result.records = document.len();
    result.skipped_rows = document.meta.skipped_rows;
    if args.dry_run {
        info!("dry run, section not written");
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&args.table, &args.section));
        document
            .write_json(&output)
            .context("write section output")?;
        info!(
            output = %output.display(),
            records = result.records,
            duration_ms = start.elapsed().as_millis(),
            "section written"
        );
        result.output = Some(output);
    }
    Ok(result)
}

pub fn run_merge(args: &MergeArgs) -> Result<MergeResult> {
    let span = info_span!("merge", output = %args.output.display());
    let _guard = span.enter();

    let mut sections = Vec::with_capacity(args.inputs.len() + args.info.len() + 1);
    if let Some(path) = &args.project {
        sections.push(load_project_info(path).context("load project info")?);
    }
    for (section, path) in &args.info {
        sections.push(
            load_info_section(section, path).with_context(|| format!("load {section}"))?,
        );
    }
    for path in &args.inputs {
        sections.push(SectionDocument::read_json(path).context("read section")?);
    }
    let document = merge_sections(&sections)?;
    write_json_value(&args.output, &document).context("write PMO document")?;
    info!(sections = sections.len(), "PMO document written");
    Ok(MergeResult {
        output: args.output.clone(),
        sections: sections
            .iter()
            .map(|section| (section.section.clone(), section.len()))
            .collect(),
    })
}

pub fn run_read_counts(args: &ReadCountsArgs) -> Result<ReadCountsResult> {
    let span = info_span!("read_counts", run = %args.run_name);
    let _guard = span.enter();

    let raw = SectionDocument::read_json(&args.raw).context("read raw read counts")?;
    let by_stage =
        SectionDocument::read_json(&args.by_stage).context("read per-stage read counts")?;
    let document = combine_read_counts(&raw, &by_stage, &args.run_name)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.raw, READ_COUNTS_SECTION));
    document
        .write_json(&output)
        .context("write read counts output")?;
    info!(output = %output.display(), "read counts written");
    Ok(ReadCountsResult {
        output,
        samples: raw.len(),
        stage_rows: by_stage.len(),
    })
}

/// `<SECTION>.json` in the table's directory.
pub fn default_output_path(table: &Path, section: &str) -> PathBuf {
    table.with_file_name(format!("{section}.json"))
}

fn collect_warnings(section: &SectionMapping) -> Vec<String> {
    [section.required(), section.optional()]
        .into_iter()
        .flatten()
        .flat_map(|round| round.suggestion.warnings.iter())
        .map(ToString::to_string)
        .collect()
}
