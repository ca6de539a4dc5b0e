use pmo_map::{MappingEngine, MatchOptions, MatchWarning, Scorer, match_fields, validate};
use pmo_model::{MatchedField, SynonymTable, TargetSchema};

fn fields(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn schema(names: &[&str]) -> TargetSchema {
    TargetSchema::new(names.iter().copied()).expect("valid schema")
}

#[test]
fn required_round_assigns_distinct_sources() {
    let source = fields(&["sample_id", "patient_name", "collection_date", "extra_field"]);
    let targets = schema(&["sampleID", "patientName", "collectionDate"]);

    let result = match_fields(&source, &targets, None, MatchOptions::required());

    assert_eq!(result.mapping.source_for("sampleID"), Some("sample_id"));
    assert_eq!(result.mapping.source_for("patientName"), Some("patient_name"));
    assert_eq!(result.mapping.source_for("collectionDate"), Some("collection_date"));
    assert_eq!(result.unused, fields(&["extra_field"]));
    assert!(result.warnings.is_empty());
    assert!(validate(&result.mapping).is_valid);

    insta::assert_json_snapshot!(result.mapping, @r#"
    [
      {
        "target": "sampleID",
        "source": "sample_id"
      },
      {
        "target": "patientName",
        "source": "patient_name"
      },
      {
        "target": "collectionDate",
        "source": "collection_date"
      }
    ]
    "#);
}

#[test]
fn too_few_sources_leaves_later_targets_unmatched() {
    let source = fields(&["id"]);
    let targets = schema(&["sampleID", "patientName"]);

    let result = match_fields(&source, &targets, None, MatchOptions::required());

    assert_eq!(result.mapping.source_for("sampleID"), Some("id"));
    assert_eq!(result.mapping.get("patientName"), Some(&MatchedField::NoMatch));
    assert!(result.unused.is_empty());
    assert_eq!(
        result.warnings,
        vec![MatchWarning::InsufficientSourceFields {
            available: 1,
            required: 2
        }]
    );
    let detail = result.detail("patientName").expect("detail");
    assert_eq!(detail.candidate, None);
    assert!(!detail.accepted);
}

#[test]
fn optional_round_rejects_weak_candidates() {
    let source = fields(&["x", "y"]);
    let targets = schema(&["target1"]);

    let result = match_fields(&source, &targets, None, MatchOptions::optional(95.0));

    assert_eq!(result.mapping.get("target1"), Some(&MatchedField::NoMatch));
    assert_eq!(result.unused, fields(&["x", "y"]));
    assert!(result.warnings.is_empty());
    let detail = result.detail("target1").expect("detail");
    assert!(detail.candidate.is_some());
    assert!(!detail.accepted);
}

#[test]
fn optional_round_never_warns_about_pool_size() {
    let targets = schema(&["umis", "chrom", "start"]);
    let result = match_fields(&[], &targets, None, MatchOptions::optional(60.0));
    assert!(result.warnings.is_empty());
    assert_eq!(result.mapping.unresolved_targets().len(), 3);
}

#[test]
fn duplicate_source_names_are_collapsed() {
    let source = fields(&["reads", "reads", "seq"]);
    let targets = schema(&["reads", "seq", "umis"]);

    let result = match_fields(&source, &targets, None, MatchOptions::required());

    assert_eq!(result.mapping.source_for("reads"), Some("reads"));
    assert_eq!(result.mapping.source_for("seq"), Some("seq"));
    assert_eq!(result.mapping.get("umis"), Some(&MatchedField::NoMatch));
    assert!(result.unused.is_empty());
    assert!(matches!(
        result.warnings.as_slice(),
        [MatchWarning::InsufficientSourceFields {
            available: 2,
            required: 3
        }]
    ));
}

#[test]
fn earlier_target_wins_a_contested_column() {
    let source = fields(&["sample_name", "zzz"]);
    let targets = schema(&["sampleName", "sample"]);

    let result = match_fields(&source, &targets, None, MatchOptions::required());

    assert_eq!(result.mapping.source_for("sampleName"), Some("sample_name"));
    assert_eq!(result.mapping.source_for("sample"), Some("zzz"));
}

#[test]
fn synonyms_find_columns_the_primary_name_misses() {
    let source = fields(&["subject", "collected_on"]);
    let targets = schema(&["specimen_name", "collection_date"]);
    let synonyms = SynonymTable::new()
        .with("specimen_name", ["subject"])
        .with("collection_date", ["collected_on"]);

    let result = match_fields(&source, &targets, Some(&synonyms), MatchOptions::optional(90.0));

    assert_eq!(result.mapping.source_for("specimen_name"), Some("subject"));
    assert_eq!(result.mapping.source_for("collection_date"), Some("collected_on"));
    assert_eq!(
        result.detail("specimen_name").and_then(|d| d.matched_on.as_deref()),
        Some("subject")
    );
}

#[test]
fn orphan_synonyms_are_reported_and_ignored() {
    let source = fields(&["reads"]);
    let targets = schema(&["reads"]);
    let synonyms = SynonymTable::new().with("read_count", ["n_reads"]);

    let result = match_fields(&source, &targets, Some(&synonyms), MatchOptions::required());

    assert_eq!(result.mapping.source_for("reads"), Some("reads"));
    assert_eq!(
        result.warnings,
        vec![MatchWarning::OrphanSynonym {
            target: "read_count".to_string()
        }]
    );
}

#[test]
fn empty_schema_leaves_everything_unused() {
    let source = fields(&["a", "b"]);
    let result = match_fields(&source, &TargetSchema::empty(), None, MatchOptions::required());
    assert!(result.mapping.is_empty());
    assert_eq!(result.unused, source);
}

struct LengthScorer;

impl Scorer for LengthScorer {
    fn score(&self, left: &str, right: &str) -> f64 {
        100.0 - (left.len() as f64 - right.len() as f64).abs().min(100.0)
    }
}

#[test]
fn engine_accepts_a_custom_scorer() {
    let engine = MappingEngine::with_scorer(LengthScorer);
    let source = fields(&["abc", "abcdef"]);
    let targets = schema(&["xyzxyz", "xyz"]);

    let result = engine.match_fields(&source, &targets, None, MatchOptions::required());

    assert_eq!(result.mapping.source_for("xyzxyz"), Some("abcdef"));
    assert_eq!(result.mapping.source_for("xyz"), Some("abc"));
}

#[test]
fn primary_name_wins_a_tie_with_its_synonym() {
    let source = fields(&["b_col", "a_col"]);
    let targets = schema(&["a_col"]);
    let synonyms = SynonymTable::new().with("a_col", ["b_col"]);

    let result = match_fields(&source, &targets, Some(&synonyms), MatchOptions::required());

    assert_eq!(result.mapping.source_for("a_col"), Some("a_col"));
    let detail = result.detail("a_col").expect("detail");
    assert_eq!(detail.matched_on.as_deref(), Some("a_col"));
    assert_eq!(detail.score, Some(100.0));
    assert_eq!(result.unused, fields(&["b_col"]));
}

struct FixedScorer(f64);

impl Scorer for FixedScorer {
    fn score(&self, _left: &str, _right: &str) -> f64 {
        self.0
    }
}

#[test]
fn optional_score_equal_to_threshold_is_accepted() {
    let engine = MappingEngine::with_scorer(FixedScorer(60.0));
    let source = fields(&["umi_count"]);
    let targets = schema(&["umis"]);

    let at = engine.match_fields(&source, &targets, None, MatchOptions::optional(60.0));
    assert_eq!(at.mapping.source_for("umis"), Some("umi_count"));
    assert!(at.detail("umis").expect("detail").accepted);

    let above = engine.match_fields(&source, &targets, None, MatchOptions::optional(60.5));
    assert_eq!(above.mapping.get("umis"), Some(&MatchedField::NoMatch));
    let detail = above.detail("umis").expect("detail");
    assert_eq!(detail.score, Some(60.0));
    assert!(!detail.accepted);
    assert_eq!(above.unused, fields(&["umi_count"]));
}
