//! Resolution output: resolved fields, items, groups and asset descriptors.

use cmsport_common::ContentId;
use cmsport_store::{FxHashSet, Item};

use crate::BLOB_REF_PREFIX;

/// A captured media item field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Everything needed to fetch and persist one blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    /// Identifier of the binary payload.
    pub blob_id: ContentId,
    /// Media item the payload belongs to.
    pub item_id: ContentId,
    pub name: String,
    pub extension: String,
    pub path: String,
    /// `<name>.<extension>`; the dedup and resume key.
    pub filename: String,
    pub attributes: Vec<Attribute>,
}

impl AssetDescriptor {
    pub fn new(
        blob_id: ContentId,
        item_id: ContentId,
        name: impl Into<String>,
        extension: impl Into<String>,
        path: impl Into<String>,
        attributes: Vec<Attribute>,
    ) -> Self {
        let name = name.into();
        let extension = extension.into();
        let filename = if extension.is_empty() {
            name.clone()
        } else {
            format!("{}.{}", name, extension)
        };
        Self {
            blob_id,
            item_id,
            name,
            extension,
            path: path.into(),
            filename,
            attributes,
        }
    }

    /// Indirection token that replaces the asset reference in field values.
    pub fn token(&self) -> String {
        format!("{}{}", BLOB_REF_PREFIX, self.blob_id)
    }
}

/// Append `incoming` assets to `assets`, skipping filenames already present.
pub(crate) fn union_assets(assets: &mut Vec<AssetDescriptor>, incoming: &[AssetDescriptor]) {
    for asset in incoming {
        if !assets.iter().any(|a| a.filename == asset.filename) {
            assets.push(asset.clone());
        }
    }
}

/// Result of one field handler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolved {
    /// Nothing to emit.
    #[default]
    Empty,
    /// Plain value.
    Scalar(String),
    /// HTML content, with the assets it embeds.
    Html {
        text: String,
        assets: Vec<AssetDescriptor>,
    },
    /// A token standing in for one asset.
    Asset {
        value: String,
        asset: AssetDescriptor,
    },
    /// Resolved referenced items.
    References {
        items: Vec<ResolvedItem>,
        assets: Vec<AssetDescriptor>,
    },
}

impl Resolved {
    /// The scalar or HTML value, if any.
    pub fn value(&self) -> &str {
        match self {
            Resolved::Scalar(value) | Resolved::Asset { value, .. } => value,
            Resolved::Html { text, .. } => text,
            Resolved::Empty | Resolved::References { .. } => "",
        }
    }

    #[inline]
    pub fn is_html(&self) -> bool {
        matches!(self, Resolved::Html { .. })
    }

    /// Assets extracted while resolving.
    pub fn assets(&self) -> &[AssetDescriptor] {
        match self {
            Resolved::Html { assets, .. } | Resolved::References { assets, .. } => assets,
            Resolved::Asset { asset, .. } => std::slice::from_ref(asset),
            Resolved::Empty | Resolved::Scalar(_) => &[],
        }
    }

    pub fn references(&self) -> &[ResolvedItem] {
        match self {
            Resolved::References { items, .. } => items,
            _ => &[],
        }
    }

    /// Force an HTML rendition of a scalar value.
    pub(crate) fn into_html(self) -> Self {
        match self {
            Resolved::Scalar(text) => Resolved::Html {
                text,
                assets: Vec::new(),
            },
            Resolved::Asset { value, asset } => Resolved::Html {
                text: value,
                assets: vec![asset],
            },
            other => other,
        }
    }
}

/// One output field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolvedField {
    /// Output name (the alias when configured).
    pub name: String,
    pub value: String,
    pub html: bool,
    pub references: Vec<ResolvedItem>,
    pub assets: Vec<AssetDescriptor>,
}

impl ResolvedField {
    pub fn new(name: impl Into<String>, resolved: Resolved) -> Self {
        let name = name.into();
        let html = resolved.is_html();
        match resolved {
            Resolved::Empty => Self {
                name,
                ..Self::default()
            },
            Resolved::Scalar(value) => Self {
                name,
                value,
                ..Self::default()
            },
            Resolved::Html { text, assets } => Self {
                name,
                value: text,
                html,
                assets,
                ..Self::default()
            },
            Resolved::Asset { value, asset } => Self {
                name,
                value,
                assets: vec![asset],
                ..Self::default()
            },
            Resolved::References { items, assets } => Self {
                name,
                references: items,
                assets,
                ..Self::default()
            },
        }
    }
}

/// An item in the output, either top-level or referenced from a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub id: ContentId,
    pub name: String,
    pub path: String,
    /// Template name; empty for referenced items.
    pub template: String,
    pub fields: Vec<ResolvedField>,
    /// Union of the field assets, by filename.
    pub assets: Vec<AssetDescriptor>,
}

impl ResolvedItem {
    /// A bare descriptor: identifier, name and path.
    pub fn describe(item: &Item) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            path: item.path.clone(),
            template: String::new(),
            fields: Vec::new(),
            assets: Vec::new(),
        }
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Add a field and fold in its assets.
    pub fn push_field(&mut self, field: ResolvedField) {
        union_assets(&mut self.assets, &field.assets);
        self.fields.push(field);
    }

    /// Order fields by output name. Equal names keep their insertion order.
    pub fn sort_fields(&mut self) {
        self.fields.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Look up a field by output name.
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// All resolved items of one template, plus their assets.
#[derive(Debug, Clone, Default)]
pub struct Group {
    name: String,
    items: Vec<ResolvedItem>,
    assets: Vec<AssetDescriptor>,
    seen: FxHashSet<String>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn items(&self) -> &[ResolvedItem] {
        &self.items
    }

    /// Assets of all items, first seen filename wins.
    #[inline]
    pub fn assets(&self) -> &[AssetDescriptor] {
        &self.assets
    }

    /// Add an item and fold in its assets.
    pub fn push(&mut self, item: ResolvedItem) {
        for asset in &item.assets {
            if self.seen.insert(asset.filename.clone()) {
                self.assets.push(asset.clone());
            }
        }
        self.items.push(item);
    }
}
