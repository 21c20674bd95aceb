use std::path::PathBuf;

use reqwest::StatusCode;

// Custom error type for preview fetch operations
#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Server returned status code {0}")]
    StatusCode(StatusCode),

    #[error("Cache storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
