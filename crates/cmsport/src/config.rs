//! Tool configuration: where the content store lives.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cmsport_store::JsonStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("can't open store: {0}")]
    Store(#[from] cmsport_store::Error),
}

/// The `config.json` the CLI reads before anything else.
///
/// ```json
/// { "store": "dump.json", "blobRoot": "blobs" }
/// ```
///
/// Relative paths are resolved against the config file's directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    /// Store dump file.
    pub store: PathBuf,
    /// Directory of blob payloads; defaults to `blobs/` next to the dump.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_root: Option<PathBuf>,
}

impl ToolConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(base) = path.parent() {
            config.store = base.join(&config.store);
            config.blob_root = config.blob_root.map(|root| base.join(root));
        }
        Ok(config)
    }

    /// Open the configured store.
    pub fn open_store(&self) -> Result<JsonStore, ConfigError> {
        Ok(JsonStore::open(&self.store, self.blob_root.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_relative_to_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "store": "data/dump.json", "blobRoot": "payloads" }"#).unwrap();

        let config = ToolConfig::load(&path).unwrap();
        assert_eq!(config.store, dir.path().join("data/dump.json"));
        assert_eq!(config.blob_root, Some(dir.path().join("payloads")));
    }

    #[test]
    fn test_open_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dump.json"), r#"{ "templates": [] }"#).unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "store": "dump.json" }"#).unwrap();

        let store = ToolConfig::load(&path).unwrap().open_store().unwrap();
        assert_eq!(store.blob_root(), dir.path().join("blobs"));
    }

    #[test]
    fn test_missing_config() {
        let err = ToolConfig::load("/nonexistent/config.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
