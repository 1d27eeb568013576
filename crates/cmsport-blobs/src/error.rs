//! Error types for blob extraction.

use cmsport_common::ContentId;
use thiserror::Error;

/// A blob that couldn't be extracted, or a pipeline that couldn't start.
#[derive(Debug, Error)]
pub enum BlobError {
    /// The store could not produce the payload.
    #[error("couldn't fetch blob {blob} for {filename}: {source}")]
    Fetch {
        blob: ContentId,
        filename: String,
        #[source]
        source: cmsport_store::Error,
    },

    /// The container could not be written.
    #[error("couldn't persist {filename}: {source}")]
    Persist {
        filename: String,
        #[source]
        source: cmsport_output::Error,
    },

    /// Every persist worker had exited before the payload was queued.
    #[error("couldn't queue {filename}: persist workers are gone")]
    QueueClosed { filename: String },

    /// The fetch pool could not be built.
    #[error("couldn't start fetch workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl BlobError {
    /// Filename of the asset the error belongs to, if any.
    pub fn filename(&self) -> Option<&str> {
        match self {
            BlobError::Fetch { filename, .. }
            | BlobError::Persist { filename, .. }
            | BlobError::QueueClosed { filename } => Some(filename),
            BlobError::Pool(_) => None,
        }
    }
}
