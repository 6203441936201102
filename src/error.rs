use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpellingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path:?}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpellingError>;
