//! Errors raised while building model values from external text.

/// Errors produced by the fragment model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("unknown category folder: {0}")]
    UnknownCategory(String),

    #[error("unknown header prefix: {0}")]
    UnknownPrefix(String),

    #[error("localisation file has no `l_<language>:` header")]
    MissingLanguageHeader,

    #[error("name table is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
