use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pmo_model::SectionSchema;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StandardsError};

/// On-disk shape of a section schema document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub schema: Option<SchemaHeader>,
    #[serde(default)]
    pub sections: Vec<SectionSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaHeader {
    pub name: String,
    pub version: u32,
}

/// Validated set of section schemas, in document order.
#[derive(Debug, Clone, Serialize)]
pub struct SectionCatalog {
    pub header: Option<SchemaHeader>,
    /// Where the document came from (`<embedded>` for the built-in one).
    pub origin: PathBuf,
    sections: Vec<SectionSchema>,
}

impl SectionCatalog {
    /// Checks section names are present and unique.
    pub fn from_document(document: SchemaDocument, origin: &Path) -> Result<Self> {
        if document.sections.is_empty() {
            return Err(StandardsError::NoSections {
                path: origin.to_path_buf(),
            });
        }
        let mut seen = BTreeSet::new();
        for section in &document.sections {
            if section.name.trim().is_empty() {
                return Err(StandardsError::EmptySectionName {
                    path: origin.to_path_buf(),
                });
            }
            if !seen.insert(section.name.as_str()) {
                return Err(StandardsError::DuplicateSection {
                    path: origin.to_path_buf(),
                    section: section.name.clone(),
                });
            }
        }
        Ok(Self {
            header: document.schema,
            origin: origin.to_path_buf(),
            sections: document.sections,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SectionSchema> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Like [`get`](Self::get), with an error listing the known sections.
    pub fn section(&self, name: &str) -> Result<&SectionSchema> {
        self.get(name).ok_or_else(|| StandardsError::UnknownSection {
            section: name.to_string(),
            available: self.names().collect::<Vec<_>>().join(", "),
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionSchema> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
