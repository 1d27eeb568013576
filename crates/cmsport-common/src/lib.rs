//! Common types for cmsport.
//!
//! This crate provides the foundational types shared by every cmsport crate:
//!
//! - [`ContentId`] - 16-byte content identifier used for items, templates, fields and blobs
//! - [`Error`] - parse errors for the shared types

mod error;
mod id;

pub use error::{Error, Result};
pub use id::ContentId;

/// Maximum number of characters of a raw value echoed back in diagnostics.
pub const SHORT_VALUE_LEN: usize = 100;

/// Shorten a raw value for log output, appending `...` when truncated.
pub fn short_value(value: &str) -> String {
    if value.chars().count() <= SHORT_VALUE_LEN {
        return value.to_string();
    }
    let end = value
        .char_indices()
        .nth(SHORT_VALUE_LEN - 1)
        .map_or(value.len(), |(idx, _)| idx);
    format!("{}...", &value[..end])
}
