//! Reading and writing corpus files with an optional byte-order mark.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{Result, SyncError};

const BOM: &str = "\u{feff}";

/// Text content of a corpus file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceText {
    /// Whether the file started with a UTF-8 byte-order mark.
    pub bom: bool,
    /// Content without the byte-order mark.
    pub text: String,
}

impl SourceText {
    /// Read a file. A missing file is `Ok(None)`, not an error; content that
    /// is not UTF-8 is [`SyncError::Encoding`].
    pub fn read(path: &Path) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(Self::from_content(content))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => Err(SyncError::Encoding(path.to_path_buf())),
            Err(e) => Err(SyncError::io(path, e)),
        }
    }

    pub fn from_content(content: String) -> Self {
        match content.strip_prefix(BOM) {
            Some(rest) => Self {
                bom: true,
                text: rest.to_string(),
            },
            None => Self {
                bom: false,
                text: content,
            },
        }
    }

    /// Write `text` back, keeping the original byte-order mark presence.
    pub fn write(&self, path: &Path, text: &str) -> Result<()> {
        let content = if self.bom {
            format!("{BOM}{text}")
        } else {
            text.to_string()
        };
        fs::write(path, content).map_err(|e| SyncError::io(path, e))
    }
}
