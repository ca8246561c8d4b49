//! Fragment categories and their header prefixes.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ModelError;

/// The four annotation families a fragment can belong to.
///
/// Each category owns one workspace sub-folder and one header prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Effect,
    Modifier,
    Trigger,
    Preferences,
}

impl Category {
    /// All categories in workspace traversal order.
    pub const ALL: [Category; 4] = [
        Category::Effect,
        Category::Modifier,
        Category::Trigger,
        Category::Preferences,
    ];

    /// Name of the workspace sub-folder holding this category's files.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Category::Effect => "effect",
            Category::Modifier => "modifier",
            Category::Trigger => "trigger",
            Category::Preferences => "preferences",
        }
    }

    /// Literal token that starts every header line of this category.
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Effect => "EFFECT",
            Category::Modifier => "MODIFIER",
            Category::Trigger => "TRIGGER",
            Category::Preferences => "PREFERENCES",
        }
    }

    /// Look up a category by its header prefix.
    pub fn from_prefix(prefix: &str) -> Result<Self, ModelError> {
        Self::ALL
            .into_iter()
            .find(|c| c.prefix() == prefix)
            .ok_or_else(|| ModelError::UnknownPrefix(prefix.to_string()))
    }
}

impl FromStr for Category {
    type Err = ModelError;

    fn from_str(folder: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.folder_name() == folder)
            .ok_or_else(|| ModelError::UnknownCategory(folder.to_string()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.folder_name())
    }
}
