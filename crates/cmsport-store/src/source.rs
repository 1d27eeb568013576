//! Store access contract.

use cmsport_common::ContentId;

use crate::model::{FieldValue, Item, Template};
use crate::snapshot::FxHashSet;
use crate::Result;

/// Retrieval of raw blob payloads by content identifier.
///
/// Called concurrently from the blob pipeline's fetch workers.
pub trait BlobSource: Sync {
    /// Load the raw bytes of a blob.
    fn load_blob(&self, id: &ContentId) -> Result<Vec<u8>>;
}

/// Bulk-load API of the content store.
pub trait ContentStore: BlobSource {
    /// Load all items whose template is one of `template_ids`.
    fn load_items(&self, template_ids: &[ContentId]) -> Result<Vec<Item>>;

    /// Load every template with its field definitions.
    fn load_templates(&self) -> Result<Vec<Template>>;

    /// Load values of `field_ids` for items of `template_ids`, querying
    /// `batch_size` field ids at a time.
    fn load_field_values(
        &self,
        field_ids: &[ContentId],
        template_ids: &[ContentId],
        batch_size: usize,
    ) -> Result<Vec<FieldValue>>;
}

/// Batched field-value filter shared by the in-process stores.
pub(crate) fn select_field_values<'a>(
    items: impl Iterator<Item = &'a Item>,
    values: &[FieldValue],
    field_ids: &[ContentId],
    template_ids: &[ContentId],
    batch_size: usize,
) -> Vec<FieldValue> {
    let templates: FxHashSet<ContentId> = template_ids.iter().copied().collect();
    let owners: FxHashSet<ContentId> = items
        .filter(|item| templates.contains(&item.template_id))
        .map(|item| item.id)
        .collect();

    let mut selected = Vec::new();
    for batch in field_ids.chunks(batch_size.max(1)) {
        let wanted: FxHashSet<ContentId> = batch.iter().copied().collect();
        selected.extend(
            values
                .iter()
                .filter(|fv| wanted.contains(&fv.field_id) && owners.contains(&fv.item_id))
                .cloned(),
        );
        tracing::trace!(batch = batch.len(), total = selected.len(), "field value batch");
    }
    selected
}
