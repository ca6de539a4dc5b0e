use std::fs;
use std::path::{Path, PathBuf};

use pmo_model::FieldKind;
use pmo_standards::{
    SchemaIssue, StandardsError, check_sections, load_sections, load_sections_or_default,
};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write schema");
    path
}

const SPECIMEN_TOML: &str = r#"
[[sections]]
name = "specimen_info"
required = ["specimen_name", "collection_date"]
optional = ["host_age", "collection_date"]

[sections.required_alternatives]
specimen_name = ["sample_id"]
collection_country = ["country"]

[sections.optional_alternatives]
host_age = ["age"]

[[sections]]
name = "notes"
"#;

#[test]
fn loads_toml_with_alternatives() {
    let temp = TempDir::new().expect("temp dir");
    let path = write(temp.path(), "sections.toml", SPECIMEN_TOML);

    let catalog = load_sections(&path).expect("load schema");
    assert_eq!(catalog.len(), 2);
    let specimen = catalog.section("specimen_info").expect("specimen section");
    assert_eq!(
        specimen.targets(FieldKind::Required).fields(),
        ["specimen_name".to_string(), "collection_date".to_string()]
    );
    assert_eq!(
        specimen.synonyms(FieldKind::Optional).synonyms_for("host_age"),
        ["age".to_string()]
    );
    assert!(catalog.get("notes").expect("notes").required.is_empty());
}

#[test]
fn check_reports_orphans_overlaps_and_empty_sections() {
    let temp = TempDir::new().expect("temp dir");
    let path = write(temp.path(), "sections.toml", SPECIMEN_TOML);
    let catalog = load_sections(&path).expect("load schema");

    let report = check_sections(&catalog);
    assert!(!report.is_clean());
    assert_eq!(report.sections, 2);
    assert_eq!(
        report.issues,
        vec![
            SchemaIssue::OrphanSynonym {
                section: "specimen_info".to_string(),
                kind: FieldKind::Required,
                target: "collection_country".to_string(),
            },
            SchemaIssue::OverlappingTarget {
                section: "specimen_info".to_string(),
                target: "collection_date".to_string(),
            },
            SchemaIssue::EmptySection {
                section: "notes".to_string(),
            },
        ]
    );

    let rendered: Vec<String> = report.issues.iter().map(ToString::to_string).collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    specimen_info: required alternatives declared for unknown target 'collection_country'
    specimen_info: 'collection_date' is both required and optional
    notes: no target fields
    ");
}

#[test]
fn loads_json_section_list() {
    let temp = TempDir::new().expect("temp dir");
    let path = write(
        temp.path(),
        "schema.JSON",
        r#"{"sections": [{"name": "mhap_info", "required": ["seq", "reads"]}]}"#,
    );

    let catalog = load_sections(&path).expect("load schema");
    let mhap = catalog.section("mhap_info").expect("mhap section");
    assert_eq!(mhap.required.len(), 2);
    assert!(mhap.optional.is_empty());
}

#[test]
fn rejects_duplicate_sections_and_targets() {
    let temp = TempDir::new().expect("temp dir");
    let path = write(
        temp.path(),
        "dup.toml",
        "[[sections]]\nname = \"a\"\n[[sections]]\nname = \"a\"\n",
    );
    let err = load_sections(&path).unwrap_err();
    assert!(matches!(err, StandardsError::DuplicateSection { ref section, .. } if section == "a"));

    let path = write(
        temp.path(),
        "targets.toml",
        "[[sections]]\nname = \"a\"\nrequired = [\"x\", \"x\"]\n",
    );
    let err = load_sections(&path).unwrap_err();
    assert!(matches!(err, StandardsError::Toml { .. }));
    assert!(err.to_string().contains("duplicate target field in schema: x"));
}

#[test]
fn rejects_unknown_extensions_and_missing_files() {
    let temp = TempDir::new().expect("temp dir");
    let path = write(temp.path(), "sections.yaml", "sections: []");
    assert!(matches!(
        load_sections(&path),
        Err(StandardsError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        load_sections(&temp.path().join("absent.toml")),
        Err(StandardsError::Io { .. })
    ));
}

#[test]
fn unknown_section_lists_available_names() {
    let catalog = load_sections_or_default(None).expect("embedded schema");
    let err = catalog.section("sequencing_info").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unknown section: sequencing_info (available: specimen_info, library_sample_info, panel_info, mhap_info)"
    );
}

#[test]
fn embedded_schema_is_clean() {
    let catalog = load_sections_or_default(None).expect("embedded schema");
    let report = check_sections(&catalog);
    assert!(report.is_clean(), "{:?}", report.issues);
    assert_eq!(report.origin, "<embedded>");

    let mhap = catalog.section("mhap_info").expect("mhap section");
    assert_eq!(
        mhap.required.fields(),
        ["library_sample_name", "target_name", "seq", "reads"].map(String::from)
    );
}

#[test]
fn override_path_replaces_embedded_schema() {
    let temp = TempDir::new().expect("temp dir");
    let path = write(temp.path(), "custom.toml", "[[sections]]\nname = \"project_info\"\nrequired = [\"project_name\"]\n");
    let catalog = load_sections_or_default(Some(&path)).expect("override schema");
    assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["project_info"]);
}
