//! JSON rendition of a group.

use cmsport_resolve::{AssetDescriptor, Group, ResolvedField, ResolvedItem};
use serde::Serialize;

use crate::Result;

#[derive(Serialize)]
struct GroupDoc<'a> {
    group: &'a str,
    items: Vec<ItemDoc<'a>>,
}

#[derive(Serialize)]
struct ItemDoc<'a> {
    id: String,
    #[serde(rename = "type", skip_serializing_if = "str::is_empty")]
    template: &'a str,
    name: &'a str,
    path: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldDoc<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blobrefs: Vec<BlobRefDoc<'a>>,
}

#[derive(Serialize)]
struct FieldDoc<'a> {
    name: &'a str,
    value: &'a str,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    html: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    refs: Vec<ItemDoc<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BlobRefDoc<'a> {
    id: String,
    item_id: String,
    filename: &'a str,
    path: &'a str,
}

impl<'a> ItemDoc<'a> {
    fn new(item: &'a ResolvedItem) -> Self {
        Self {
            id: item.id.to_string(),
            template: &item.template,
            name: &item.name,
            path: &item.path,
            fields: item.fields.iter().map(FieldDoc::new).collect(),
            blobrefs: item.assets.iter().map(BlobRefDoc::new).collect(),
        }
    }
}

impl<'a> FieldDoc<'a> {
    fn new(field: &'a ResolvedField) -> Self {
        Self {
            name: &field.name,
            value: &field.value,
            html: field.html,
            refs: field.references.iter().map(ItemDoc::new).collect(),
        }
    }
}

impl<'a> BlobRefDoc<'a> {
    fn new(asset: &'a AssetDescriptor) -> Self {
        Self {
            id: asset.blob_id.to_string(),
            item_id: asset.item_id.to_string(),
            filename: &asset.filename,
            path: &asset.path,
        }
    }
}

/// Render a group as a pretty-printed JSON document.
pub fn group_to_json(group: &Group) -> Result<String> {
    let doc = GroupDoc {
        group: group.name(),
        items: group.items().iter().map(ItemDoc::new).collect(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}
