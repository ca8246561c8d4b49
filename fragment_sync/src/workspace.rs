//! Workspace layout: one folder per category under a common root.

use fragment_model::{Category, FragmentRecord};
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::{Diagnostics, EventKind, SyncEvent};
use crate::error::{Result, SyncError};
use crate::scanner::BlockScanner;

const TARGET: &str = "fragment_sync::workspace";

/// A scanned workspace root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    extension: String,
}

impl Workspace {
    /// Open a workspace. The root must be an existing directory.
    pub fn open(root: impl Into<PathBuf>, extension: impl Into<String>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(SyncError::WorkspaceMissing(root));
        }
        Ok(Self {
            root,
            extension: extension.into().trim_start_matches('.').to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.folder_name())
    }

    /// Script files of one category, sorted by file name.
    ///
    /// A missing category folder is reported and yields no files.
    pub fn files(&self, category: Category, diag: &mut Diagnostics) -> Result<Vec<PathBuf>> {
        let dir = self.category_dir(category);
        if !dir.is_dir() {
            diag.record(
                TARGET,
                SyncEvent::new(EventKind::MissingCategoryFolder, format!("no {category} folder; skipped"))
                    .with_location(&dir, None),
            );
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| SyncError::io(&dir, e))? {
            let path = entry.map_err(|e| SyncError::io(&dir, e))?.path();
            if path.is_file() && self.has_extension(&path) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension))
    }

    /// Scan every category folder in order: effect, modifier, trigger,
    /// preferences. Records come back in traversal order.
    pub fn scan_all(&self, scanner: &BlockScanner, diag: &mut Diagnostics) -> Result<Vec<FragmentRecord>> {
        let mut records = Vec::new();
        for category in Category::ALL {
            let files = self.files(category, diag)?;
            diag.debug(TARGET, format!("{category}: {} file(s)", files.len()));
            for path in files {
                records.extend(scanner.scan_file(category, &path, diag)?);
            }
        }
        diag.info(TARGET, format!("scanned {} fragment(s)", records.len()));
        Ok(records)
    }
}
