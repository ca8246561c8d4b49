//! Run configuration loaded from `fragment_sync.toml`.
//!
//! Every key is optional; a missing file means the defaults below.
//!
//! ```toml
//! workspace = "meta_files"
//! names = "localisation/english/NIE_laws_l_english.yml"
//! entity_pattern = 'NIE_law_branch_\d+_id_\d+_value_\d+_idea'
//! extension = "txt"
//! brace_counting = "literal"
//!
//! [log]
//! level = "debug"
//! folder = "pdx_logs"
//! console = true
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};
use crate::scanner::{BlockScanner, BraceCounting, HeaderGrammar, DEFAULT_ENTITY_PATTERN};

pub const DEFAULT_CONFIG_FILE: &str = "fragment_sync.toml";

/// Verbosity of the run log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    #[default]
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Folder for `latest.log`. `None` disables the file sink.
    pub folder: Option<PathBuf>,
    /// Mirror the log to standard output.
    pub console: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Debug,
            folder: Some(PathBuf::from("pdx_logs")),
            console: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Root holding the `effect/`, `modifier/`, `trigger/` and
    /// `preferences/` folders.
    pub workspace: PathBuf,
    /// Canonical name table (`.yml` localisation or `.json` map).
    pub names: Option<PathBuf>,
    pub entity_pattern: String,
    /// Extension of script files, without the dot.
    pub extension: String,
    pub brace_counting: BraceCounting,
    pub log: LogConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("meta_files"),
            names: None,
            entity_pattern: DEFAULT_ENTITY_PATTERN.to_string(),
            extension: "txt".to_string(),
            brace_counting: BraceCounting::default(),
            log: LogConfig::default(),
        }
    }
}

impl SyncConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(SyncError::io(path, e)),
        }
    }

    /// Compile the header grammar for the configured entity pattern.
    pub fn header_grammar(&self) -> Result<HeaderGrammar> {
        HeaderGrammar::new(&self.entity_pattern)
    }

    pub fn scanner(&self) -> Result<BlockScanner> {
        Ok(BlockScanner::new(self.header_grammar()?, self.brace_counting))
    }
}
