//! Tests for pmo-model types.

use pmo_model::{
    FieldKind, FieldMapping, FinalizedSection, MatchedField, SectionSchema, SynonymTable,
    TargetSchema,
};

fn mapping(pairs: &[(&str, Option<&str>)]) -> FieldMapping {
    pairs
        .iter()
        .map(|(target, source)| {
            let value = match source {
                Some(name) => MatchedField::source(*name),
                None => MatchedField::NoMatch,
            };
            (*target, value)
        })
        .collect()
}

#[test]
fn target_schema_keeps_declaration_order() {
    let schema = TargetSchema::new(["sampleID", "patientName", "collectionDate"]).unwrap();
    let names: Vec<&str> = schema.iter().collect();
    assert_eq!(names, vec!["sampleID", "patientName", "collectionDate"]);
    assert!(schema.contains("patientName"));
    assert!(!schema.contains("patient_name"));
}

#[test]
fn target_schema_rejects_blank_names() {
    assert!(TargetSchema::new(["ok", "  "]).is_err());
}

#[test]
fn synonym_table_reports_orphans() {
    let schema = TargetSchema::new(["sampleID"]).unwrap();
    let synonyms = SynonymTable::new()
        .with("sampleID", ["sample_name"])
        .with("sampleId", ["typo"]);
    assert_eq!(synonyms.orphans(&schema), vec!["sampleId"]);
    assert_eq!(synonyms.synonyms_for("sampleID"), ["sample_name".to_string()]);
    assert!(synonyms.synonyms_for("missing").is_empty());
}

#[test]
fn unused_fields_excludes_assigned_sources_only() {
    let m = mapping(&[("a", Some("f1")), ("b", None), ("c", Some("f3"))]);
    let sources: Vec<String> = ["f1", "f2", "f3", "f4"].iter().map(|s| s.to_string()).collect();
    assert_eq!(m.unused_fields(&sources), vec!["f2", "f4"]);
    assert_eq!(m.unresolved_targets(), vec!["b"]);
    assert_eq!(m.resolved_count(), 2);
}

#[test]
fn insert_replaces_in_place() {
    let mut m = mapping(&[("a", Some("f1")), ("b", Some("f2"))]);
    m.insert("a", MatchedField::NoMatch);
    let targets: Vec<&str> = m.targets().collect();
    assert_eq!(targets, vec!["a", "b"]);
    assert_eq!(m.get("a"), Some(&MatchedField::NoMatch));
    assert_eq!(m.source_for("a"), None);
    assert_eq!(m.source_for("b"), Some("f2"));
}

#[test]
fn section_schema_parses_alternative_keys() {
    let json = r#"{
        "name": "panel_info",
        "required": ["target_name", "forward_primer_seq"],
        "required_alternatives": {"target_name": ["target", "amplicon"]},
        "optional": ["gene_name"]
    }"#;
    let section: SectionSchema = serde_json::from_str(json).expect("parse section");
    assert_eq!(section.targets(FieldKind::Required).len(), 2);
    assert_eq!(
        section.synonyms(FieldKind::Required).synonyms_for("target_name"),
        ["target".to_string(), "amplicon".to_string()]
    );
    assert!(section.synonyms(FieldKind::Optional).is_empty());
}

#[test]
fn section_schema_rejects_duplicate_targets() {
    let json = r#"{"name": "x", "required": ["a", "a"]}"#;
    assert!(serde_json::from_str::<SectionSchema>(json).is_err());
}

#[test]
fn finalized_section_output_columns() {
    let section = FinalizedSection::new(
        "specimen_info",
        mapping(&[("specimen_name", Some("specimen"))]),
        mapping(&[("host_age", None), ("host_sex", Some("sex"))]),
        vec!["site".to_string()],
    );
    assert_eq!(
        section.output_columns(),
        vec![
            ("specimen_name", "specimen"),
            ("host_sex", "sex"),
            ("site", "site")
        ]
    );
}

#[test]
fn field_kind_no_match_rule() {
    assert!(!FieldKind::Required.allows_no_match());
    assert!(FieldKind::Optional.allows_no_match());
    assert_eq!(FieldKind::Optional.to_string(), "optional");
}
