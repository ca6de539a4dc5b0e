use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pmo_map::{RoundState, Scorer, SectionMapping};
use pmo_model::{FieldKind, NO_MATCH_LABEL};
use pmo_standards::{SchemaReport, SectionCatalog};

use crate::types::{MapResult, MappingRow, MergeResult, ReadCountsResult};

/// Rows for every target of the matched rounds, then the additional columns.
pub fn mapping_rows<S: Scorer>(section: &SectionMapping<S>) -> Vec<MappingRow> {
    let mut rows = Vec::new();
    if let Some(round) = section.required() {
        push_round_rows(&mut rows, FieldKind::Required, round);
    }
    if let Some(round) = section.optional() {
        push_round_rows(&mut rows, FieldKind::Optional, round);
    }
    for column in section.additional().unwrap_or_default() {
        rows.push(MappingRow {
            kind: "additional",
            target: column.clone(),
            source: column.clone(),
            score: None,
            overridden: false,
        });
    }
    rows
}

fn push_round_rows(rows: &mut Vec<MappingRow>, kind: FieldKind, round: &RoundState) {
    for (target, current) in round.mapping.iter() {
        let suggested = round.suggestion.mapping.get(target);
        let overridden = suggested != Some(current);
        let score = round
            .suggestion
            .detail(target)
            .filter(|detail| detail.accepted && !overridden)
            .and_then(|detail| detail.score);
        rows.push(MappingRow {
            kind: kind.as_str(),
            target: target.to_string(),
            source: current.to_string(),
            score,
            overridden,
        });
    }
}

pub fn print_map_result(result: &MapResult) {
    println!("Section: {}", result.section);
    println!("Table: {}", result.table.display());
    let mut table = mapping_table(&result.rows);
    table.set_width(120);
    println!("{table}");
    let summary = &result.summary;
    println!(
        "Required: {}/{}  Optional: {}/{}  Additional: {}  Unused: {}",
        summary.required_mapped,
        summary.required_total,
        summary.optional_mapped,
        summary.optional_total,
        summary.additional,
        summary.unused
    );
    if !result.unused.is_empty() {
        println!("Unused columns: {}", result.unused.join(", "));
    }
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    if result.is_ready() {
        match &result.output {
            Some(path) => println!(
                "Wrote {} records to {} ({} empty rows skipped)",
                result.records,
                path.display(),
                result.skipped_rows
            ),
            None => println!("Mapping is ready ({}); dry run, nothing written", result.stage),
        }
    } else {
        eprintln!("Mapping is not ready:");
        for issue in &result.issues {
            eprintln!("- {issue}");
        }
    }
}

/// The mapping as a table: kind, target, source column, score.
pub fn mapping_table(rows: &[MappingRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Target"),
        header_cell("Source"),
        header_cell("Score"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for row in rows {
        table.add_row(vec![
            kind_cell(row.kind),
            Cell::new(&row.target),
            source_cell(row),
            score_cell(row),
        ]);
    }
    table
}

pub fn print_sections(catalog: &SectionCatalog, report: &SchemaReport) {
    println!("Schema: {}", catalog.origin.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Required"),
        header_cell("Optional"),
    ]);
    apply_table_style(&mut table);
    for section in catalog.iter() {
        table.add_row(vec![
            Cell::new(&section.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(section.required.fields().join("\n")),
            field_list_cell(section.optional.fields()),
        ]);
    }
    println!("{table}");
    if !report.is_clean() {
        println!();
        println!("Schema issues:");
        for issue in &report.issues {
            println!("- {issue}");
        }
    }
}

pub fn print_merge_result(result: &MergeResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Section"), header_cell("Records")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (section, records) in &result.sections {
        table.add_row(vec![Cell::new(section), count_cell(*records)]);
    }
    println!("{table}");
    println!("Output: {}", result.output.display());
}

pub fn print_read_counts_result(result: &ReadCountsResult) {
    println!(
        "Combined {} stage rows for {} library samples into {}",
        result.stage_rows,
        result.samples,
        result.output.display()
    );
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn kind_cell(kind: &str) -> Cell {
    match kind {
        "required" => Cell::new(kind).fg(Color::Blue),
        "additional" => Cell::new(kind).fg(Color::Magenta),
        _ => Cell::new(kind),
    }
}

fn source_cell(row: &MappingRow) -> Cell {
    if row.source == NO_MATCH_LABEL {
        let color = if row.kind == "required" {
            Color::Red
        } else {
            Color::DarkGrey
        };
        return Cell::new(&row.source).fg(color);
    }
    if row.overridden {
        Cell::new(format!("{} (manual)", row.source)).fg(Color::Yellow)
    } else {
        Cell::new(&row.source)
    }
}

fn score_cell(row: &MappingRow) -> Cell {
    match row.score {
        Some(score) => Cell::new(format!("{score:.1}")),
        None => dim_cell("-"),
    }
}

fn field_list_cell(fields: &[String]) -> Cell {
    if fields.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(fields.join("\n"))
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use pmo_map::OverrideSet;
    use pmo_model::{SectionSchema, TargetSchema};

    use super::*;

    fn panel_mapping() -> SectionMapping {
        let schema = SectionSchema::new(
            "panel_info",
            TargetSchema::new(["target_name", "forward_primer_seq"]).expect("required"),
            TargetSchema::new(["gene_name"]).expect("optional"),
        );
        let columns = ["target_name", "forward_primer_seq", "gene_name", "comment"];
        SectionMapping::new(schema, columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn rows_follow_rounds_then_additional() {
        let mut section = panel_mapping();
        section.match_required();
        section.match_optional(60.0).expect("optional round");
        section
            .override_optional(&OverrideSet::new().no_match("gene_name"))
            .expect("override");
        section.select_additional(&["comment"]).expect("additional");

        let rows: Vec<_> = mapping_rows(&section)
            .into_iter()
            .map(|row| (row.kind, row.target, row.source, row.overridden))
            .collect();
        insta::assert_json_snapshot!(rows, @r#"
        [
          [
            "required",
            "target_name",
            "target_name",
            false
          ],
          [
            "required",
            "forward_primer_seq",
            "forward_primer_seq",
            false
          ],
          [
            "optional",
            "gene_name",
            "no match",
            true
          ],
          [
            "additional",
            "comment",
            "comment",
            false
          ]
        ]
        "#);
    }

    #[test]
    fn exact_names_score_full_marks() {
        let mut section = panel_mapping();
        section.match_required();
        let rows = mapping_rows(&section);
        assert!(rows.iter().all(|row| row.score == Some(100.0)));
    }

    #[test]
    fn table_marks_manual_choices() {
        let rows = vec![MappingRow {
            kind: "required",
            target: "target_name".to_string(),
            source: "locus".to_string(),
            score: None,
            overridden: true,
        }];
        let mut table = mapping_table(&rows);
        table.force_no_tty();
        let rendered = table.to_string();
        assert!(rendered.contains("locus (manual)"));
        assert!(rendered.contains("target_name"));
    }
}
