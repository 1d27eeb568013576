//! Error types for cmsport-common.

use thiserror::Error;

/// Common error type for cmsport operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid content identifier format.
    #[error("invalid content id {value:?}: {reason}")]
    InvalidId { value: String, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
