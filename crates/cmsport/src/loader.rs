//! Builds a [`Snapshot`] from a [`ContentStore`] according to the settings.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use cmsport_common::ContentId;
use cmsport_resolve::{Settings, TemplateSettings};
use cmsport_store::{
    ContentStore, FieldValue, FxHashMap, FxHashSet, Item, Snapshot, Template, BLOB_FIELD,
    EXTENSION_FIELD,
};
use thiserror::Error;

/// Field ids per field-value query.
pub const FIELD_BATCH_SIZE: usize = 30;

/// Setup failures while loading. All of them are fatal.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("store error: {0}")]
    Store(#[from] cmsport_store::Error),

    #[error("template {name} ({id}) not found in store")]
    TemplateNotFound { name: String, id: ContentId },

    #[error("field {field} not found on template {template} ({id})")]
    FieldNotFound {
        field: String,
        template: String,
        id: ContentId,
    },
}

/// Load everything the resolver needs for one run.
///
/// Every configured template, and every non-pseudo field on it, must exist
/// in the store. Standard values items are kept apart as template defaults.
/// With `since`, only items changed after it (or with a value changed after
/// it) are reported; the reference lookup is never narrowed.
pub fn load_snapshot<S>(
    store: &S,
    settings: &Settings,
    since: Option<DateTime<Utc>>,
) -> Result<Snapshot, LoadError>
where
    S: ContentStore + ?Sized,
{
    let template_ids = settings.template_ids();
    let items = store.load_items(&template_ids)?;
    let templates: FxHashMap<ContentId, Template> = store
        .load_templates()?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    validate(settings, &templates)?;

    let field_ids = wanted_fields(settings, &templates);
    let values = store.load_field_values(&field_ids, &template_ids, FIELD_BATCH_SIZE)?;
    tracing::debug!(
        items = items.len(),
        fields = field_ids.len(),
        values = values.len(),
        "loaded from store"
    );

    let mut by_item: FxHashMap<ContentId, Vec<FieldValue>> = FxHashMap::default();
    for value in values {
        by_item.entry(value.item_id).or_default().push(value);
    }

    let standard_values: FxHashSet<ContentId> =
        templates.values().filter_map(|t| t.standard_values).collect();

    let mut builder = Snapshot::builder();
    for template in templates.into_values() {
        builder = builder.template(template);
    }

    let mut reported = 0usize;
    let mut unchanged = 0usize;
    for mut item in items {
        item.values = by_item.remove(&item.id).unwrap_or_default();
        let item = Arc::new(item);

        if standard_values.contains(&item.id) {
            builder = builder.standard_values(item);
            continue;
        }

        if accepts(settings.reference_template(&item.template_id), &item) {
            builder = builder.reference(Arc::clone(&item));
        }

        if accepts(settings.template(&item.template_id), &item) {
            if since.map_or(true, |t| item.modified_since(t)) {
                builder = builder.item(item);
                reported += 1;
            } else {
                unchanged += 1;
            }
        }
    }

    let snapshot = builder.build();
    tracing::info!(
        items = reported,
        unchanged,
        references = snapshot.reference_count(),
        "snapshot loaded"
    );
    Ok(snapshot)
}

fn accepts(settings: Option<&TemplateSettings>, item: &Item) -> bool {
    settings.is_some_and(|t| t.accepts_path(&item.path))
}

fn validate(settings: &Settings, templates: &FxHashMap<ContentId, Template>) -> Result<(), LoadError> {
    for configured in settings.templates().iter().chain(settings.references()) {
        let template =
            templates
                .get(&configured.template_id)
                .ok_or_else(|| LoadError::TemplateNotFound {
                    name: configured.name.clone(),
                    id: configured.template_id,
                })?;

        for field in configured.fields().iter().filter(|f| !f.is_pseudo()) {
            if template.find_field(&field.name).is_none() {
                return Err(LoadError::FieldNotFound {
                    field: field.name.clone(),
                    template: template.name.clone(),
                    id: template.id,
                });
            }
        }
    }
    Ok(())
}

/// Ids of every field the resolver may read, in first-seen order.
fn wanted_fields(settings: &Settings, templates: &FxHashMap<ContentId, Template>) -> Vec<ContentId> {
    let mut seen = FxHashSet::default();
    let mut ids = Vec::new();
    let mut add = |id: ContentId| {
        if seen.insert(id) {
            ids.push(id);
        }
    };

    let configured: Vec<_> = settings
        .templates()
        .iter()
        .chain(settings.references())
        .filter_map(|t| templates.get(&t.template_id).map(|template| (t, template)))
        .collect();

    let ref_fields: Vec<&str> = configured
        .iter()
        .flat_map(|(t, _)| t.fields())
        .filter(|f| !f.uses_item_name())
        .filter_map(|f| f.ref_field.as_deref())
        .collect();

    for (settings_template, template) in &configured {
        for field in settings_template.fields().iter().filter(|f| !f.is_pseudo()) {
            if let Some(found) = template.find_field(&field.name) {
                add(found.id);
            }
        }
        let extra = [BLOB_FIELD, EXTENSION_FIELD]
            .into_iter()
            .chain(settings.assets().custom_fields.iter().map(String::as_str));
        for name in extra {
            if let Some(found) = template.find_field(name) {
                add(found.id);
            }
        }
    }

    for template in settings.references() {
        if let Some(template) = templates.get(&template.template_id) {
            for name in &ref_fields {
                if let Some(found) = template.find_field(name) {
                    add(found.id);
                }
            }
        }
    }

    ids
}
