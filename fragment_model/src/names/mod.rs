//! Canonical name table - the source of truth for fragment annotations.
//!
//! The table is produced by the content generator. Besides real display
//! texts it carries two sentinels:
//! - **ToBeWritten**: the entity exists but its name has not been authored yet
//! - **Dynamic**: the name is produced at runtime by scripted localisation

mod localisation;

pub use localisation::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use crate::fragment::EntityId;

/// Marker the generator writes for names that still have to be authored.
pub const TO_BE_WRITTEN_MARKER: &str = "TO_BE_WRITTEN";

/// Marker the generator writes for runtime-generated names.
pub const DYNAMIC_MARKER: &str = "DY_LOC";

/// One entry of the canonical name table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanonicalName {
    Text(String),
    ToBeWritten,
    Dynamic,
}

impl CanonicalName {
    /// Classify a raw generator value, recognising the sentinel markers.
    ///
    /// Accepts both the bare markers and the `# MARKER` comment form. Line
    /// breaks inside a text are escaped to `\n` so the name stays on one
    /// header line, as in the generated localisation file.
    pub fn from_raw(raw: &str) -> Self {
        let value = raw.trim();
        let marker = value.trim_start_matches('#').trim();
        if value.is_empty() || marker == TO_BE_WRITTEN_MARKER {
            CanonicalName::ToBeWritten
        } else if marker == DYNAMIC_MARKER {
            CanonicalName::Dynamic
        } else {
            CanonicalName::Text(escape_line_breaks(value))
        }
    }

    /// The text an annotation should carry, if this entry has one.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            CanonicalName::Text(text) => Some(text.trim()).filter(|t| !t.is_empty()),
            CanonicalName::ToBeWritten | CanonicalName::Dynamic => None,
        }
    }

    /// Check if this entry is one of the sentinels.
    pub fn is_placeholder(&self) -> bool {
        self.display_text().is_none()
    }
}

/// Escape `\r\n`, `\n` and `\r` to their two-character forms.
pub fn escape_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Mapping `entity -> canonical display name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CanonicalNameTable {
    names: HashMap<EntityId, CanonicalName>,
}

impl CanonicalNameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object `{ "<entity>": "<text>" }`.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
        Ok(raw
            .into_iter()
            .map(|(id, text)| (EntityId(id), CanonicalName::from_raw(&text)))
            .collect())
    }

    /// Insert or replace an entry, returning the previous one.
    pub fn insert(&mut self, id: impl Into<EntityId>, name: CanonicalName) -> Option<CanonicalName> {
        self.names.insert(id.into(), name)
    }

    /// Insert a display text, classifying sentinel markers.
    pub fn insert_text(&mut self, id: impl Into<EntityId>, text: &str) -> Option<CanonicalName> {
        self.insert(id, CanonicalName::from_raw(text))
    }

    pub fn get(&self, id: &str) -> Option<&CanonicalName> {
        self.names.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over all entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &CanonicalName)> {
        self.names.iter()
    }
}

impl FromIterator<(EntityId, CanonicalName)> for CanonicalNameTable {
    fn from_iter<I: IntoIterator<Item = (EntityId, CanonicalName)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_classification() {
        assert_eq!(CanonicalName::from_raw(""), CanonicalName::ToBeWritten);
        assert_eq!(CanonicalName::from_raw("TO_BE_WRITTEN"), CanonicalName::ToBeWritten);
        assert_eq!(CanonicalName::from_raw("# TO_BE_WRITTEN"), CanonicalName::ToBeWritten);
        assert_eq!(CanonicalName::from_raw("# DY_LOC"), CanonicalName::Dynamic);
        assert_eq!(
            CanonicalName::from_raw(" Martial Law "),
            CanonicalName::Text("Martial Law".to_string())
        );
    }

    #[test]
    fn test_display_text() {
        assert_eq!(CanonicalName::Text("Some Law".into()).display_text(), Some("Some Law"));
        assert!(CanonicalName::Text("  ".into()).is_placeholder());
        assert!(CanonicalName::Dynamic.is_placeholder());
    }

    #[test]
    fn test_from_json() {
        let table = CanonicalNameTable::from_json_str(
            r#"{
                "NIE_law_branch_1_id_1_value_1_idea": "Conscription: Volunteer Only",
                "NIE_law_branch_1_id_1_value_2_idea": "DY_LOC",
                "NIE_law_branch_1_id_1_value_3_idea": ""
            }"#,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.get("NIE_law_branch_1_id_1_value_1_idea").and_then(|n| n.display_text()),
            Some("Conscription: Volunteer Only")
        );
        assert_eq!(
            table.get("NIE_law_branch_1_id_1_value_2_idea"),
            Some(&CanonicalName::Dynamic)
        );
        assert_eq!(
            table.get("NIE_law_branch_1_id_1_value_3_idea"),
            Some(&CanonicalName::ToBeWritten)
        );
    }

    #[test]
    fn test_line_breaks_are_escaped() {
        assert_eq!(
            CanonicalName::from_raw("Line one\nLine two\r\nLine three\rend\n"),
            CanonicalName::Text(r"Line one\nLine two\nLine three\rend".to_string())
        );

        let table = CanonicalNameTable::from_json_str(
            r#"{"NIE_law_branch_1_id_1_value_1_idea": "Line one\nLine two"}"#,
        )
        .unwrap();
        let name = table.get("NIE_law_branch_1_id_1_value_1_idea").and_then(|n| n.display_text());
        assert_eq!(name, Some(r"Line one\nLine two"));
        assert!(!name.unwrap().contains('\n'));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(CanonicalNameTable::from_json_str("[1, 2]").is_err());
    }
}
