use std::path::PathBuf;

/// Errors from the I/O-facing entry points. Operations on DSL source never fail;
/// they report problems as data (parse errors, diagnostics, error responses).
#[derive(thiserror::Error, Debug)]
pub enum WebCeeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid request '{0}': expected `METHOD /path?query`")]
    InvalidRequest(String),
}
