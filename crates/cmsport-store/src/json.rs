//! Content store backed by a JSON dump and a directory of blob files.
//!
//! Dump layout:
//!
//! ```json
//! {
//!   "templates": [{ "id": "...", "name": "Page", "standardValues": "...",
//!                   "fields": [{ "id": "...", "name": "Title", "type": "Single-Line Text" }] }],
//!   "items": [{ "id": "...", "name": "home", "path": "/sitecore/content/home",
//!               "templateId": "...", "created": "2024-01-01T00:00:00Z", "updated": "..." }],
//!   "fieldValues": [{ "fieldId": "...", "itemId": "...", "language": "en", "value": "..." }]
//! }
//! ```
//!
//! Blob payloads live in the blob root as one file per blob, named by the
//! hyphenated blob id.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cmsport_common::ContentId;
use serde::{Deserialize, Serialize};

use crate::model::{FieldValue, Item, Template};
use crate::source::{select_field_values, BlobSource, ContentStore};
use crate::{Error, Result};

/// Serialized form of a store export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDump {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub field_values: Vec<FieldValue>,
}

/// A read-only store over a [`StoreDump`] file.
#[derive(Debug)]
pub struct JsonStore {
    dump: StoreDump,
    blob_root: PathBuf,
}

impl JsonStore {
    /// Open a dump file. The blob root defaults to `blobs/` next to the dump.
    pub fn open<P: AsRef<Path>>(path: P, blob_root: Option<PathBuf>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dump: StoreDump = serde_json::from_reader(BufReader::new(file))?;

        let blob_root = blob_root.unwrap_or_else(|| {
            path.parent()
                .unwrap_or_else(|| Path::new("."))
                .join("blobs")
        });

        tracing::debug!(
            path = %path.display(),
            templates = dump.templates.len(),
            items = dump.items.len(),
            values = dump.field_values.len(),
            "opened store dump"
        );

        Ok(Self::from_dump(dump, blob_root))
    }

    /// Wrap an already parsed dump.
    pub fn from_dump(dump: StoreDump, blob_root: PathBuf) -> Self {
        Self { dump, blob_root }
    }

    /// Directory holding blob payload files.
    #[inline]
    pub fn blob_root(&self) -> &Path {
        &self.blob_root
    }

    /// Path of the payload file for a blob.
    pub fn blob_path(&self, id: &ContentId) -> PathBuf {
        self.blob_root.join(id.to_string())
    }
}

impl BlobSource for JsonStore {
    fn load_blob(&self, id: &ContentId) -> Result<Vec<u8>> {
        let path = self.blob_path(id);
        std::fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                Error::BlobNotFound(*id)
            } else {
                Error::BlobRead { id: *id, source }
            }
        })
    }
}

impl ContentStore for JsonStore {
    fn load_items(&self, template_ids: &[ContentId]) -> Result<Vec<Item>> {
        Ok(self
            .dump
            .items
            .iter()
            .filter(|item| template_ids.contains(&item.template_id))
            .cloned()
            .collect())
    }

    fn load_templates(&self) -> Result<Vec<Template>> {
        Ok(self.dump.templates.clone())
    }

    fn load_field_values(
        &self,
        field_ids: &[ContentId],
        template_ids: &[ContentId],
        batch_size: usize,
    ) -> Result<Vec<FieldValue>> {
        Ok(select_field_values(
            self.dump.items.iter(),
            &self.dump.field_values,
            field_ids,
            template_ids,
            batch_size,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUMP: &str = r#"{
        "templates": [{
            "id": "11111111-1111-1111-1111-111111111111",
            "name": "Page",
            "fields": [{ "id": "22222222-2222-2222-2222-222222222222", "name": "Title", "type": "Single-Line Text" }]
        }],
        "items": [{
            "id": "33333333-3333-3333-3333-333333333333",
            "name": "home",
            "path": "/sitecore/content/home",
            "templateId": "{11111111-1111-1111-1111-111111111111}",
            "updated": "2024-03-01T12:00:00Z"
        }],
        "fieldValues": [{
            "fieldId": "22222222-2222-2222-2222-222222222222",
            "itemId": "33333333-3333-3333-3333-333333333333",
            "language": "en",
            "value": "Welcome"
        }]
    }"#;

    #[test]
    fn test_open_dump_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let dump_path = dir.path().join("dump.json");
        std::fs::write(&dump_path, DUMP).unwrap();

        let store = JsonStore::open(&dump_path, None).unwrap();
        assert_eq!(store.blob_root(), dir.path().join("blobs"));

        let templates = store.load_templates().unwrap();
        assert_eq!(templates[0].fields[0].field_type, "Single-Line Text");

        let template_id = templates[0].id;
        let items = store.load_items(&[template_id]).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "home");

        let values = store
            .load_field_values(&[templates[0].fields[0].id], &[template_id], 30)
            .unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].value, "Welcome");
    }

    #[test]
    fn test_load_blob_from_root() {
        let dir = tempfile::tempdir().unwrap();
        let blob_id: ContentId = "44444444-4444-4444-4444-444444444444".parse().unwrap();
        std::fs::write(dir.path().join(blob_id.to_string()), b"\x89PNG").unwrap();

        let store = JsonStore::from_dump(StoreDump::default(), dir.path().to_path_buf());
        assert_eq!(store.load_blob(&blob_id).unwrap(), b"\x89PNG");

        let missing = ContentId::from_bytes([5; 16]);
        assert!(matches!(store.load_blob(&missing), Err(Error::BlobNotFound(id)) if id == missing));
    }
}
