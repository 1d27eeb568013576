//! Error types for store access.

use cmsport_common::ContentId;
use thiserror::Error;

/// Errors that can occur when reading from a content store.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] cmsport_common::Error),

    /// Malformed store dump.
    #[error("invalid store dump: {0}")]
    Json(#[from] serde_json::Error),

    /// Blob payload not present in the store.
    #[error("blob not found: {0}")]
    BlobNotFound(ContentId),

    /// Blob payload present but unreadable.
    #[error("couldn't load blob {id}: {source}")]
    BlobRead {
        id: ContentId,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;
