//! Built-in field handlers.

mod media;
mod reference;
mod text;

use std::sync::OnceLock;

use cmsport_common::ContentId;
use regex::Regex;

use crate::error::FieldErrorKind;
use crate::model::Resolved;
use crate::resolver::{FieldInput, Resolver};

pub use media::{attachment, extract_asset, general_link, media};
pub use reference::{reference_list, single_reference};
pub use text::rich_text;

/// `<image .../>` or `<file .../>` carrying `mediaid="{GUID}"`.
fn media_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<(?:image|file)\s[^>]*?mediaid="\{([A-Fa-f0-9-]+)\}"[^>]*?/>"#)
            .expect("valid media tag pattern")
    })
}

fn parse_id(raw: &str) -> Result<ContentId, FieldErrorKind> {
    raw.parse().map_err(|_| FieldErrorKind::MalformedId {
        value: raw.to_string(),
    })
}

/// Non-empty `|`-separated tokens.
fn id_tokens(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('|').map(str::trim).filter(|t| !t.is_empty())
}

/// Pass the raw value through.
pub fn scalar(_: &mut Resolver<'_>, input: &FieldInput<'_>) -> Result<Resolved, FieldErrorKind> {
    Ok(Resolved::Scalar(input.raw().to_string()))
}

#[cfg(test)]
mod tests {
    use cmsport_store::{Item, Snapshot, Template, TemplateField};

    use super::*;
    use crate::error::FieldError;
    use crate::registry::HandlerRegistry;
    use crate::settings::{AssetSettings, FieldProperties, FieldSettings};
    use crate::testutil::*;

    fn resolve_with(
        registry: &HandlerRegistry,
        snapshot: &Snapshot,
        item: ContentId,
        field: u8,
        settings: &FieldSettings,
    ) -> (Result<Resolved, FieldError>, Vec<FieldError>) {
        let assets = AssetSettings::new(["Alt"]);
        let mut resolver = Resolver::new(registry, snapshot, &assets, "en");
        let item = snapshot
            .item(&item)
            .or_else(|| snapshot.reference(&item))
            .unwrap();
        let field = snapshot.template_of(item).unwrap().field(&id(field)).unwrap();
        let value = item.field_value(&field.id, "en").unwrap();
        let input = FieldInput {
            value,
            field,
            item,
            settings,
        };
        let result = resolver.resolve(&input);
        (result, resolver.take_diagnostics())
    }

    fn resolve(
        snapshot: &Snapshot,
        item: u8,
        field: u8,
        settings: &FieldSettings,
    ) -> (Result<Resolved, FieldError>, Vec<FieldError>) {
        resolve_with(&HandlerRegistry::standard(), snapshot, id(item), field, settings)
    }

    #[test]
    fn test_rich_text_rewrites_found_and_keeps_missing() {
        let missing = id(99);
        let body = format!(
            "<p><image mediaid=\"{}\" alt=\"x\" /></p><p><img src=\"-/media/{}.ashx?h=10\" /></p>",
            id(LOGO).to_braced(),
            missing.to_compact()
        );
        let snapshot = site().item(page(100, "home").with_value(id(BODY), "en", body)).build();

        let (result, diagnostics) = resolve(&snapshot, 100, BODY, &FieldSettings::new("Body"));
        let resolved = result.unwrap();

        let token = format!("blobref:{}", id(LOGO_BLOB));
        assert!(resolved.is_html());
        assert!(resolved.value().contains(&format!("mediaid=\"{}\"", token)));
        assert!(resolved.value().contains(&format!("-/media/{}.ashx", missing.to_compact())));
        assert_eq!(resolved.assets().len(), 1);
        assert_eq!(resolved.assets()[0].filename, "logo.png");
        assert_eq!(resolved.assets()[0].attributes[0].value, "logo alt");

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].item_id, id(100));
        assert!(matches!(diagnostics[0].kind, FieldErrorKind::ReferenceNotFound(m) if m == missing));
    }

    #[test]
    fn test_rich_text_media_url_rewritten() {
        let body = format!("<img src=\"-/media/{}.ashx\" />", id(BANNER).to_compact());
        let snapshot = site().item(page(100, "home").with_value(id(BODY), "en", body)).build();

        let (result, diagnostics) = resolve(&snapshot, 100, BODY, &FieldSettings::new("Body"));
        let resolved = result.unwrap();
        assert_eq!(resolved.value(), format!("<img src=\"blobref:{}\" />", id(BANNER_BLOB)));
        assert_eq!(resolved.assets()[0].filename, "banner.jpg");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_rich_text_malformed_id_fails_field() {
        let snapshot = site()
            .item(page(100, "home").with_value(id(BODY), "en", "<image mediaid=\"{ABC-123}\" />"))
            .build();

        let (result, _) = resolve(&snapshot, 100, BODY, &FieldSettings::new("Body"));
        let err = result.unwrap_err();
        assert_eq!(err.field_name, "Body");
        assert!(matches!(err.kind, FieldErrorKind::MalformedId { ref value } if value == "ABC-123"));
    }

    #[test]
    fn test_rich_text_formatter_strips_empty_paragraphs() {
        let snapshot = site()
            .item(page(100, "home").with_value(id(BODY), "en", "<p>Hi</p>\n<p> </p>\n"))
            .build();
        let (result, _) = resolve(&snapshot, 100, BODY, &FieldSettings::new("Body"));
        assert_eq!(result.unwrap().value(), "<p>Hi</p>\n");
    }

    #[test]
    fn test_reference_list_skips_bad_tokens() {
        let value = format!("|{}|badid|{}|", id(NEWS), id(SPORT).to_braced());
        let snapshot = site().item(page(100, "home").with_value(id(TAGS), "en", value)).build();

        let settings = FieldSettings::new("Tags").with_ref_field("Title");
        let (result, diagnostics) = resolve(&snapshot, 100, TAGS, &settings);
        let resolved = result.unwrap();

        let names: Vec<_> = resolved.references().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["news", "sport"]);
        assert_eq!(resolved.references()[0].field("Title").unwrap().value, "News");
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].kind, FieldErrorKind::MalformedId { .. }));
    }

    #[test]
    fn test_reference_list_item_name_sentinel() {
        let value = format!("{}|{}", id(NEWS), id(99));
        let snapshot = site().item(page(100, "home").with_value(id(TAGS), "en", value)).build();

        let settings = FieldSettings::new("Tags").with_ref_field(":name");
        let (result, diagnostics) = resolve(&snapshot, 100, TAGS, &settings);
        let resolved = result.unwrap();

        assert_eq!(resolved.references().len(), 1);
        assert_eq!(resolved.references()[0].path, "/sitecore/content/tags/news");
        assert!(resolved.references()[0].fields.is_empty());
        assert!(matches!(diagnostics[0].kind, FieldErrorKind::ReferenceNotFound(_)));
    }

    #[test]
    fn test_single_reference_rejects_many() {
        let value = format!("{}|{}", id(NEWS), id(SPORT));
        let snapshot = site().item(page(100, "home").with_value(id(CATEGORY), "en", value)).build();

        let (result, _) = resolve(&snapshot, 100, CATEGORY, &FieldSettings::new("Category"));
        assert!(matches!(result.unwrap_err().kind, FieldErrorKind::MultipleReferences(2)));
    }

    #[test]
    fn test_single_reference_missing_target() {
        let snapshot = site()
            .item(page(100, "home").with_value(id(CATEGORY), "en", id(98).to_braced()))
            .build();
        let (result, _) = resolve(&snapshot, 100, CATEGORY, &FieldSettings::new("Category"));
        assert!(matches!(result.unwrap_err().kind, FieldErrorKind::ReferenceNotFound(m) if m == id(98)));
    }

    #[test]
    fn test_reference_carries_nested_assets() {
        // A category whose Title field is itself an image.
        let template = Template::new(id(4), "Category")
            .with_field(TemplateField::new(id(31), "Title", "Image"));
        let category = Item::new(id(60), "featured", "/sitecore/content/categories/featured", id(4))
            .with_value(id(31), "en", format!("<image mediaid=\"{}\" />", id(LOGO).to_braced()));
        let snapshot = site()
            .template(template)
            .reference(category)
            .item(page(100, "home").with_value(id(CATEGORY), "en", id(60).to_string()))
            .build();

        let settings = FieldSettings::new("Category").with_ref_field("Title");
        let (result, _) = resolve(&snapshot, 100, CATEGORY, &settings);
        let resolved = result.unwrap();

        assert_eq!(resolved.references()[0].name, "featured");
        assert_eq!(resolved.assets().len(), 1);
        assert_eq!(resolved.assets()[0].blob_id, id(LOGO_BLOB));
    }

    #[test]
    fn test_reference_cycle_detected() {
        let template = Template::new(id(5), "Node").with_field(TemplateField::new(id(32), "Next", "Droplink"));
        let a = Item::new(id(70), "a", "/nodes/a", id(5)).with_value(id(32), "en", id(71).to_string());
        let b = Item::new(id(71), "b", "/nodes/b", id(5)).with_value(id(32), "en", id(70).to_string());
        let snapshot = Snapshot::builder()
            .template(template)
            .item(a.clone())
            .reference(a)
            .reference(b)
            .build();

        let settings = FieldSettings::new("Next").with_ref_field("Next");
        let (result, _) = resolve(&snapshot, 70, 32, &settings);
        let err = result.unwrap_err();

        match err.kind {
            FieldErrorKind::Reference(inner) => {
                assert_eq!(inner.item_id, id(71));
                assert!(matches!(inner.kind, FieldErrorKind::ReferenceCycle(c) if c == id(70)));
            }
            other => panic!("expected nested error, got {:?}", other),
        }
    }

    #[test]
    fn test_media_field_token() {
        let value = format!("<image mediaid=\"{}\" />", id(BANNER).to_braced());
        let snapshot = site().item(page(100, "home").with_value(id(HERO), "en", value)).build();

        let (result, _) = resolve(&snapshot, 100, HERO, &FieldSettings::new("Hero"));
        let resolved = result.unwrap();
        assert_eq!(resolved.value(), format!("blobref:{}", id(BANNER_BLOB)));
        assert_eq!(resolved.assets()[0].item_id, id(BANNER));
        assert!(!resolved.is_html());
    }

    #[test]
    fn test_media_field_bad_markup() {
        let snapshot = site().item(page(100, "home").with_value(id(HERO), "en", "not markup")).build();
        let (result, _) = resolve(&snapshot, 100, HERO, &FieldSettings::new("Hero"));
        assert!(matches!(result.unwrap_err().kind, FieldErrorKind::UnexpectedFormat { .. }));
    }

    #[test]
    fn test_general_link_media_and_plain() {
        let value = format!(
            "<link text=\"Logo\" linktype=\"media\" url=\"/logo\" id=\"{}\" />",
            id(LOGO).to_braced()
        );
        let snapshot = site()
            .item(page(100, "home").with_value(id(LINK), "en", value))
            .item(page(101, "about").with_value(id(LINK), "en", "<link linktype=\"external\" url=\"https://example.com\" />"))
            .build();

        let (result, _) = resolve(&snapshot, 100, LINK, &FieldSettings::new("Link"));
        let resolved = result.unwrap();
        assert_eq!(
            resolved.value(),
            format!(
                "<link text=\"Logo\" linktype=\"media\" url=\"/logo\" id=\"blobref:{}\" />",
                id(LOGO_BLOB)
            )
        );
        assert_eq!(resolved.assets().len(), 1);

        let (plain, _) = resolve(&snapshot, 101, LINK, &FieldSettings::new("Link"));
        assert_eq!(
            plain.unwrap(),
            Resolved::Scalar("<link linktype=\"external\" url=\"https://example.com\" />".into())
        );
    }

    #[test]
    fn test_attachment_uses_owning_item() {
        let snapshot = site().item(media_item(44, "manual", 45, "pdf")).build();

        let (result, _) = resolve(&snapshot, 44, BLOB, &FieldSettings::new("Blob"));
        let resolved = result.unwrap();
        let asset = &resolved.assets()[0];
        assert_eq!(asset.blob_id, id(45));
        assert_eq!(asset.item_id, id(44));
        assert_eq!(asset.filename, "manual.pdf");
        assert_eq!(asset.attributes, vec![crate::Attribute::new("Alt", "manual alt")]);
    }

    #[test]
    fn test_blob_property_overrides_type() {
        let snapshot = site()
            .item(page(100, "home").with_value(id(TITLE), "en", id(LOGO_BLOB).to_string()))
            .build();
        let settings = FieldSettings::new("Title").with_properties(FieldProperties { blob: true, html: false });

        // Page template has no Blob/Extension fields.
        let (result, _) = resolve(&snapshot, 100, TITLE, &settings);
        assert!(matches!(result.unwrap_err().kind, FieldErrorKind::AssetFieldsMissing { blob: true, extension: true, .. }));
    }

    #[test]
    fn test_html_property_and_unknown_type() {
        let snapshot = site()
            .item(page(100, "home").with_value(id(WIDGET), "en", "<b>raw</b>"))
            .build();

        let (plain, _) = resolve(&snapshot, 100, WIDGET, &FieldSettings::new("Widget"));
        assert_eq!(plain.unwrap(), Resolved::Scalar("<b>raw</b>".into()));

        let settings = FieldSettings::new("Widget").with_properties(FieldProperties { blob: false, html: true });
        let (html, _) = resolve(&snapshot, 100, WIDGET, &settings);
        assert!(html.unwrap().is_html());
    }

    #[test]
    fn test_registry_with_mock_handler() {
        fn shout(_: &mut Resolver<'_>, input: &FieldInput<'_>) -> Result<Resolved, FieldErrorKind> {
            Ok(Resolved::Scalar(input.raw().to_uppercase()))
        }

        let registry = HandlerRegistry::builder()
            .with_standard_handlers()
            .handler("Single-Line Text", shout)
            .build();
        let snapshot = site().item(page(100, "home").with_value(id(TITLE), "en", "hello")).build();

        let (result, _) = resolve_with(&registry, &snapshot, id(100), TITLE, &FieldSettings::new("Title"));
        assert_eq!(result.unwrap().value(), "HELLO");
    }

    #[test]
    fn test_field_error_truncates_value() {
        let long = format!("<image mediaid=\"{{BAD}}\" />{}", "x".repeat(200));
        let snapshot = site().item(page(100, "home").with_value(id(BODY), "en", long)).build();
        let (result, _) = resolve(&snapshot, 100, BODY, &FieldSettings::new("Body"));
        let err = result.unwrap_err();
        assert!(err.value.ends_with("..."));
        assert!(err.value.len() <= cmsport_common::SHORT_VALUE_LEN + 3);
        assert!(err.to_string().contains("Body"));
    }
}
