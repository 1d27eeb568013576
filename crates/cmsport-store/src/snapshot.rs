//! In-memory snapshot of the store, immutable for the duration of a run.

use std::hash::BuildHasherDefault;
use std::sync::Arc;

use cmsport_common::ContentId;
use hashbrown::{HashMap as FastHashMap, HashSet as FastHashSet};
use rustc_hash::FxHasher;

use crate::model::{FieldValue, Item, Template};

pub type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;
pub type FxHashSet<K> = FastHashSet<K, BuildHasherDefault<FxHasher>>;

/// Item lookup by identifier.
pub type ItemMap = FxHashMap<ContentId, Arc<Item>>;

/// Everything the resolver may look at during a run.
///
/// - `report_items`: the items selected for export, sorted by name
/// - `items`: lookup for same-scope items
/// - `references`: lookup for cross-type references (media, link targets)
/// - `templates` and per-template standard values items
#[derive(Debug, Default)]
pub struct Snapshot {
    report_items: Vec<Arc<Item>>,
    items: ItemMap,
    references: ItemMap,
    templates: FxHashMap<ContentId, Arc<Template>>,
    standard_values: FxHashMap<ContentId, Arc<Item>>,
}

impl Snapshot {
    /// Start building a snapshot.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Items selected for export, in name order.
    #[inline]
    pub fn report_items(&self) -> &[Arc<Item>] {
        &self.report_items
    }

    /// Look up a same-scope item.
    #[inline]
    pub fn item(&self, id: &ContentId) -> Option<&Arc<Item>> {
        self.items.get(id)
    }

    /// Look up a reference item.
    #[inline]
    pub fn reference(&self, id: &ContentId) -> Option<&Arc<Item>> {
        self.references.get(id)
    }

    /// Number of reference items.
    #[inline]
    pub fn reference_count(&self) -> usize {
        self.references.len()
    }

    /// Look up a template.
    #[inline]
    pub fn template(&self, id: &ContentId) -> Option<&Arc<Template>> {
        self.templates.get(id)
    }

    /// The template of an item.
    #[inline]
    pub fn template_of(&self, item: &Item) -> Option<&Arc<Template>> {
        self.templates.get(&item.template_id)
    }

    /// The standard values item of a template.
    #[inline]
    pub fn standard_values(&self, template_id: &ContentId) -> Option<&Arc<Item>> {
        self.standard_values.get(template_id)
    }

    /// An item's value for a field, falling back to its template's standard values.
    pub fn field_value_or_default<'a>(
        &'a self,
        item: &'a Item,
        field_id: &ContentId,
        language: &str,
    ) -> Option<&'a FieldValue> {
        item.field_value(field_id, language).or_else(|| {
            self.standard_values(&item.template_id)
                .filter(|sv| sv.id != item.id)
                .and_then(|sv| sv.field_value(field_id, language))
        })
    }
}

/// Builder for [`Snapshot`].
///
/// # Example
///
/// ```
/// use cmsport_store::{ContentId, Item, Snapshot, Template};
///
/// let template_id = ContentId::from_bytes([1; 16]);
/// let snapshot = Snapshot::builder()
///     .template(Template::new(template_id, "Page"))
///     .item(Item::new(ContentId::from_bytes([2; 16]), "home", "/content/home", template_id))
///     .build();
///
/// assert_eq!(snapshot.report_items().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    report_items: Vec<Arc<Item>>,
    items: ItemMap,
    references: ItemMap,
    templates: FxHashMap<ContentId, Arc<Template>>,
    standard_values: FxHashMap<ContentId, Arc<Item>>,
}

impl SnapshotBuilder {
    /// Register a template.
    pub fn template(mut self, template: impl Into<Arc<Template>>) -> Self {
        let template = template.into();
        self.templates.insert(template.id, template);
        self
    }

    /// Register an item selected for export.
    pub fn item(mut self, item: impl Into<Arc<Item>>) -> Self {
        let item = item.into();
        self.items.insert(item.id, Arc::clone(&item));
        self.report_items.push(item);
        self
    }

    /// Register an item available for reference resolution.
    pub fn reference(mut self, item: impl Into<Arc<Item>>) -> Self {
        let item = item.into();
        self.references.insert(item.id, item);
        self
    }

    /// Register the standard values item for the item's template.
    pub fn standard_values(mut self, item: impl Into<Arc<Item>>) -> Self {
        let item = item.into();
        self.standard_values.insert(item.template_id, item);
        self
    }

    /// Finish the snapshot; report items are ordered by name, then id.
    pub fn build(mut self) -> Snapshot {
        self.report_items
            .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        self.report_items.dedup_by(|a, b| a.id == b.id);

        Snapshot {
            report_items: self.report_items,
            items: self.items,
            references: self.references,
            templates: self.templates,
            standard_values: self.standard_values,
        }
    }
}
