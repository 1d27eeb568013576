//! Shared fixture: a small site with pages, tags and media.

use cmsport_common::ContentId;
use cmsport_store::{Item, Snapshot, SnapshotBuilder, Template, TemplateField};

use crate::settings::{AssetSettings, FieldSettings, Settings, TemplateSettings};

pub fn id(n: u8) -> ContentId {
    ContentId::from_bytes([n; 16])
}

pub const PAGE: u8 = 1;
pub const MEDIA: u8 = 2;
pub const TAG: u8 = 3;

pub const TITLE: u8 = 10;
pub const BODY: u8 = 11;
pub const TAGS: u8 = 12;
pub const HERO: u8 = 13;
pub const CATEGORY: u8 = 14;
pub const LINK: u8 = 15;
pub const WIDGET: u8 = 16;

pub const BLOB: u8 = 20;
pub const EXTENSION: u8 = 21;
pub const ALT: u8 = 22;
pub const TAG_TITLE: u8 = 30;

pub const LOGO: u8 = 40;
pub const LOGO_BLOB: u8 = 41;
pub const BANNER: u8 = 42;
pub const BANNER_BLOB: u8 = 43;
pub const NEWS: u8 = 50;
pub const SPORT: u8 = 51;

pub fn page_template() -> Template {
    Template::new(id(PAGE), "Page")
        .with_field(TemplateField::new(id(TITLE), "Title", "Single-Line Text"))
        .with_field(TemplateField::new(id(BODY), "Body", "Rich Text"))
        .with_field(TemplateField::new(id(TAGS), "Tags", "Treelist"))
        .with_field(TemplateField::new(id(HERO), "Hero", "Image"))
        .with_field(TemplateField::new(id(CATEGORY), "Category", "Droplink"))
        .with_field(TemplateField::new(id(LINK), "Link", "General Link"))
        .with_field(TemplateField::new(id(WIDGET), "Widget", "Fancy Widget"))
}

pub fn media_template() -> Template {
    Template::new(id(MEDIA), "Image")
        .with_field(TemplateField::new(id(BLOB), "Blob", "attachment"))
        .with_field(TemplateField::new(id(EXTENSION), "Extension", "Single-Line Text"))
        .with_field(TemplateField::new(id(ALT), "Alt", "Single-Line Text"))
}

pub fn tag_template() -> Template {
    Template::new(id(TAG), "Tag").with_field(TemplateField::new(id(TAG_TITLE), "Title", "Single-Line Text"))
}

pub fn media_item(n: u8, name: &str, blob: u8, extension: &str) -> Item {
    Item::new(id(n), name, format!("/sitecore/media library/{}", name), id(MEDIA))
        .with_value(id(BLOB), "", id(blob).to_string())
        .with_value(id(EXTENSION), "", extension)
        .with_value(id(ALT), "en", format!("{} alt", name))
}

pub fn tag_item(n: u8, name: &str, title: &str) -> Item {
    Item::new(id(n), name, format!("/sitecore/content/tags/{}", name), id(TAG))
        .with_value(id(TAG_TITLE), "en", title)
}

pub fn page(n: u8, name: &str) -> Item {
    Item::new(id(n), name, format!("/sitecore/content/home/{}", name), id(PAGE))
}

/// Templates plus the media and tag reference items.
pub fn site() -> SnapshotBuilder {
    Snapshot::builder()
        .template(page_template())
        .template(media_template())
        .template(tag_template())
        .reference(media_item(LOGO, "logo", LOGO_BLOB, "png"))
        .reference(media_item(BANNER, "banner", BANNER_BLOB, "jpg"))
        .reference(tag_item(NEWS, "news", "News"))
        .reference(tag_item(SPORT, "sport", "Sport"))
}

pub fn page_settings() -> TemplateSettings {
    TemplateSettings::new("Pages", id(PAGE))
        .with_field(FieldSettings::new("Title"))
        .with_field(FieldSettings::new("Body"))
        .with_field(FieldSettings::new("Tags").with_ref_field("Title"))
        .with_field(FieldSettings::new("Hero"))
        .with_field(FieldSettings::new("Category").with_ref_field(":name"))
        .with_field(FieldSettings::new("Link"))
        .with_field(FieldSettings::new("Widget"))
}

pub fn settings() -> Settings {
    Settings::new("en", vec![page_settings()], Vec::new(), AssetSettings::new(["Alt"]))
}
