use std::path::PathBuf;

/// Errors that abort a sync run.
///
/// Per-record and per-file problems are not errors; they are recorded as
/// [`crate::SyncEvent`]s and the run continues.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8", .0.display())]
    Encoding(PathBuf),

    #[error("workspace root does not exist: {}", .0.display())]
    WorkspaceMissing(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid entity pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("unsupported name table format: {}", .0.display())]
    NamesFormat(PathBuf),

    #[error("no canonical name table configured")]
    NamesMissing,

    #[error(transparent)]
    Model(#[from] fragment_model::ModelError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("logging setup failed: {0}")]
    Logging(#[from] log::SetLoggerError),
}

impl SyncError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
