//! Fragment records extracted from script files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{Category, EntityId};

/// One hand-authored header+body block.
///
/// The body is read-only for the whole pipeline; only the annotation may be
/// replaced, and only through [`FragmentRecord::set_annotation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragmentRecord {
    pub category: Category,
    pub entity_id: EntityId,

    /// Behavior slot the fragment implements (e.g. `on_add`, `available`).
    pub sub_type: String,

    /// Display name from the header comment. `None` when the comment is
    /// absent or blank.
    pub annotation: Option<String>,

    /// Normalized block content between the header and its closing brace.
    body: String,

    pub source_file: PathBuf,

    /// 1-based line of the header in `source_file`.
    pub line: usize,

    /// Set when the annotation was replaced in memory and must be written back.
    #[serde(default)]
    pub changed: bool,
}

impl FragmentRecord {
    /// Create a record with no annotation and an empty body.
    pub fn new(category: Category, entity_id: impl Into<EntityId>, sub_type: impl Into<String>) -> Self {
        Self {
            category,
            entity_id: entity_id.into(),
            sub_type: sub_type.into(),
            annotation: None,
            body: String::new(),
            source_file: PathBuf::new(),
            line: 0,
            changed: false,
        }
    }

    /// Set the annotation as scanned. Blank names become `None`.
    pub fn with_annotation(mut self, name: Option<&str>) -> Self {
        self.annotation = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        self
    }

    /// Set the normalized body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the file and header line the record was read from.
    pub fn with_source(mut self, path: impl Into<PathBuf>, line: usize) -> Self {
        self.source_file = path.into();
        self.line = line;
        self
    }

    /// The normalized body.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    /// The annotation, or an empty string when absent.
    pub fn annotation_text(&self) -> &str {
        self.annotation.as_deref().unwrap_or("")
    }

    /// Check if the header carries a display name.
    pub fn has_annotation(&self) -> bool {
        self.annotation.is_some()
    }

    /// Replace the annotation. Marks the record changed only if the name
    /// actually differs; returns whether it did.
    pub fn set_annotation(&mut self, name: &str) -> bool {
        let name = name.trim();
        if self.annotation_text() == name {
            return false;
        }
        self.annotation = if name.is_empty() {
            None
        } else {
            Some(name.to_string())
        };
        self.changed = true;
        true
    }

    /// The `(entity, sub_type)` pair that identifies the header inside its file.
    pub fn header_key(&self) -> (&str, &str) {
        (self.entity_id.as_str(), self.sub_type.as_str())
    }

    /// The literal `PREFIX_entity_subtype` token of the header line.
    pub fn header_token(&self) -> String {
        format!("{}_{}_{}", self.category.prefix(), self.entity_id, self.sub_type)
    }
}
