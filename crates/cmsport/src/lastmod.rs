//! Last-run marker next to the settings file.
//!
//! A run started with `--lastmod` only reports items changed since the time
//! stored in `<settings>.lastmod`, and rewrites the marker when it succeeds.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};

/// Marker timestamp layout (UTC, millisecond precision).
pub const LASTMOD_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// `settings.json` -> `settings.json.lastmod`.
pub fn lastmod_path(settings_path: &Path) -> PathBuf {
    let mut name = OsString::from(settings_path.as_os_str());
    name.push(".lastmod");
    PathBuf::from(name)
}

pub fn format_lastmod(at: DateTime<Utc>) -> String {
    at.format(LASTMOD_FORMAT).to_string()
}

/// Read the marker. Missing or unreadable markers mean "no filter".
pub fn read_lastmod(path: &Path) -> Option<DateTime<Utc>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!(path = %path.display(), "no last-run marker: {}", err);
            return None;
        }
    };

    match NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S%.f") {
        Ok(naive) => Some(naive.and_utc()),
        Err(err) => {
            tracing::warn!(path = %path.display(), value = text.trim(), "ignoring last-run marker: {}", err);
            None
        }
    }
}

pub fn write_lastmod(path: &Path, at: DateTime<Utc>) -> std::io::Result<()> {
    std::fs::write(path, format_lastmod(at))
}
