use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("text extraction failed: {0}")]
    Extraction(String),

    #[error("{tool} not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    ToolNotFound { tool: String },

    #[error("{tool} failed with exit code {code}: {stderr}")]
    ToolFailed {
        tool: String,
        code: i32,
        stderr: String,
    },

    #[error("no text could be extracted (document is empty or DRM protected)")]
    Drm,

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("'{0}' is not a valid ISBN")]
    InvalidIsbn(String),

    #[error("ISBN-13 prefix {prefix} of {isbn} is not accepted")]
    PrefixNotAccepted { isbn: String, prefix: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
