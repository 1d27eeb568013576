//! In-memory content store.

use cmsport_common::ContentId;
use parking_lot::Mutex;

use crate::model::{FieldValue, Item, Template};
use crate::snapshot::FxHashMap;
use crate::source::{select_field_values, BlobSource, ContentStore};
use crate::{Error, Result};

/// A content store held entirely in memory.
///
/// Records every blob fetch, which makes it the store of choice for tests
/// that count retrievals.
#[derive(Debug, Default)]
pub struct MemoryStore {
    templates: Vec<Template>,
    items: Vec<Item>,
    values: Vec<FieldValue>,
    blobs: FxHashMap<ContentId, Vec<u8>>,
    fetches: Mutex<Vec<ContentId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    /// Add an item. Values attached to the item are moved into the value table.
    pub fn with_item(mut self, mut item: Item) -> Self {
        self.values.append(&mut item.values);
        self.items.push(item);
        self
    }

    pub fn with_value(mut self, value: FieldValue) -> Self {
        self.values.push(value);
        self
    }

    pub fn with_blob(mut self, id: ContentId, data: impl Into<Vec<u8>>) -> Self {
        self.blobs.insert(id, data.into());
        self
    }

    /// Identifiers passed to [`BlobSource::load_blob`], in call order.
    pub fn fetch_log(&self) -> Vec<ContentId> {
        self.fetches.lock().clone()
    }

    /// Number of blob fetches so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.lock().len()
    }
}

impl BlobSource for MemoryStore {
    fn load_blob(&self, id: &ContentId) -> Result<Vec<u8>> {
        self.fetches.lock().push(*id);
        self.blobs.get(id).cloned().ok_or(Error::BlobNotFound(*id))
    }
}

impl ContentStore for MemoryStore {
    fn load_items(&self, template_ids: &[ContentId]) -> Result<Vec<Item>> {
        Ok(self
            .items
            .iter()
            .filter(|item| template_ids.contains(&item.template_id))
            .cloned()
            .collect())
    }

    fn load_templates(&self) -> Result<Vec<Template>> {
        Ok(self.templates.clone())
    }

    fn load_field_values(
        &self,
        field_ids: &[ContentId],
        template_ids: &[ContentId],
        batch_size: usize,
    ) -> Result<Vec<FieldValue>> {
        Ok(select_field_values(
            self.items.iter(),
            &self.values,
            field_ids,
            template_ids,
            batch_size,
        ))
    }
}
