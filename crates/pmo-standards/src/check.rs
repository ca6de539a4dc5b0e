#![deny(unsafe_code)]

use std::fmt;

use pmo_model::FieldKind;
use serde::Serialize;
use tracing::warn;

use crate::catalog::SectionCatalog;

/// Non-fatal problem in a section schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum SchemaIssue {
    /// Synonyms declared for a name that is not a target of that list.
    OrphanSynonym {
        section: String,
        kind: FieldKind,
        target: String,
    },
    /// Target listed as both required and optional.
    OverlappingTarget { section: String, target: String },
    /// Section with neither required nor optional targets.
    EmptySection { section: String },
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanSynonym {
                section,
                kind,
                target,
            } => write!(
                f,
                "{section}: {kind} alternatives declared for unknown target '{target}'"
            ),
            Self::OverlappingTarget { section, target } => {
                write!(f, "{section}: '{target}' is both required and optional")
            }
            Self::EmptySection { section } => write!(f, "{section}: no target fields"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaReport {
    pub origin: String,
    pub sections: usize,
    pub issues: Vec<SchemaIssue>,
}

impl SchemaReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Collects every [`SchemaIssue`] in `catalog`, logging each at `warn`.
pub fn check_sections(catalog: &SectionCatalog) -> SchemaReport {
    let mut issues = Vec::new();
    for section in catalog.iter() {
        if section.required.is_empty() && section.optional.is_empty() {
            issues.push(SchemaIssue::EmptySection {
                section: section.name.clone(),
            });
        }
        for kind in [FieldKind::Required, FieldKind::Optional] {
            for target in section.synonyms(kind).orphans(section.targets(kind)) {
                issues.push(SchemaIssue::OrphanSynonym {
                    section: section.name.clone(),
                    kind,
                    target: target.to_string(),
                });
            }
        }
        for target in section.overlapping_targets() {
            issues.push(SchemaIssue::OverlappingTarget {
                section: section.name.clone(),
                target: target.to_string(),
            });
        }
    }
    for issue in &issues {
        warn!("schema issue: {issue}");
    }
    SchemaReport {
        origin: catalog.origin.display().to_string(),
        sections: catalog.len(),
        issues,
    }
}
