//! Error types for the output writers.

use thiserror::Error;

/// Output error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("UTF-8 error: {0}")]
    Utf8(String),

    #[error("unknown content format {0:?} (expected xml or json)")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, Error>;
