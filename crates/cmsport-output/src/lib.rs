//! Writers for assembled content.
//!
//! - [`write_groups`]: one document per [`Group`](cmsport_resolve::Group), XML or JSON
//! - [`BlobContainer`]: a self-contained XML file holding one asset's
//!   metadata and its base64 payload

mod blob;
mod error;
mod format;
mod json;
mod xml;

pub use blob::{container_path, BlobContainer, CONTAINER_EXTENSION};
pub use error::{Error, Result};
pub use format::ContentFormat;
pub use json::group_to_json;
pub use xml::{group_to_xml, write_group_xml};

use std::path::{Path, PathBuf};

use cmsport_resolve::Group;

/// Write one document per group into `dir`, named `<group>.<ext>`.
///
/// Returns the paths written, in group order.
pub fn write_groups<P: AsRef<Path>>(
    groups: &[Group],
    dir: P,
    format: ContentFormat,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(groups.len());
    for group in groups {
        let path = dir.join(format!("{}.{}", file_stem(group.name()), format.extension()));
        let document = match format {
            ContentFormat::Xml => group_to_xml(group)?,
            ContentFormat::Json => group_to_json(group)?,
        };
        std::fs::write(&path, document)?;
        tracing::info!(
            group = group.name(),
            items = group.items().len(),
            path = %path.display(),
            "wrote group"
        );
        written.push(path);
    }
    Ok(written)
}

/// Make a group or asset name safe to use as a single file name.
pub(crate) fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixture {
    use cmsport_common::ContentId;
    use cmsport_resolve::{AssetDescriptor, Attribute, Group, Resolved, ResolvedField, ResolvedItem};

    pub fn id(n: u8) -> ContentId {
        ContentId::from_bytes([n; 16])
    }

    pub fn logo() -> AssetDescriptor {
        AssetDescriptor::new(
            id(40),
            id(41),
            "logo",
            "png",
            "/media/logo",
            vec![Attribute::new("Alt", "Company logo")],
        )
    }

    fn item(n: u8, name: &str) -> ResolvedItem {
        ResolvedItem {
            id: id(n),
            name: name.to_string(),
            path: format!("/content/{}", name),
            template: "Pages".to_string(),
            fields: Vec::new(),
            assets: Vec::new(),
        }
    }

    /// A page with a scalar, an HTML field, a reference and an image.
    pub fn pages() -> Group {
        let mut home = item(1, "home");
        home.push_field(ResolvedField::new("Title", Resolved::Scalar("Home & Garden".into())));
        home.push_field(ResolvedField::new(
            "Body",
            Resolved::Html {
                text: "<p>Hi</p>]]><p>there</p>".into(),
                assets: Vec::new(),
            },
        ));

        let mut tag = item(2, "news");
        tag.template.clear();
        tag.push_field(ResolvedField::new("Title", Resolved::Scalar("News".into())));
        home.push_field(ResolvedField::new(
            "Tags",
            Resolved::References {
                items: vec![tag],
                assets: Vec::new(),
            },
        ));

        let asset = logo();
        home.push_field(ResolvedField::new(
            "Hero",
            Resolved::Asset {
                value: asset.token(),
                asset,
            },
        ));

        let mut group = Group::new("Pages");
        group.push(home);
        group
    }
}
