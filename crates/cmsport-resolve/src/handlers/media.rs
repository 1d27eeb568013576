use std::sync::OnceLock;

use cmsport_common::ContentId;
use cmsport_store::{Item, Template, TemplateField, BLOB_FIELD, EXTENSION_FIELD};
use regex::Regex;

use super::{media_tag, parse_id, scalar};
use crate::error::FieldErrorKind;
use crate::model::{AssetDescriptor, Attribute, Resolved};
use crate::resolver::{FieldInput, Resolver};
use crate::settings::AssetSettings;

/// `<link ... linktype="media" ...>`.
fn media_link() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<link\b[^>]*\blinktype="media"[^>]*>"#).expect("valid media link pattern")
    })
}

fn link_id() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"\bid="\{([A-Fa-f0-9-]+)\}""#).expect("valid link id pattern"))
}

/// Image and file fields: replace the media markup with a token.
pub fn media(resolver: &mut Resolver<'_>, input: &FieldInput<'_>) -> Result<Resolved, FieldErrorKind> {
    let raw = input.raw();
    if raw.trim().is_empty() {
        return Ok(Resolved::Empty);
    }

    let caps = media_tag()
        .captures(raw)
        .ok_or_else(|| FieldErrorKind::UnexpectedFormat {
            field_type: input.field_type().to_string(),
        })?;
    let id = parse_id(&caps[1])?;
    let asset = extract_asset(resolver, &id)?;
    Ok(Resolved::Asset {
        value: asset.token(),
        asset,
    })
}

/// Links to media items get their id swapped for a token in place;
/// every other link passes through unchanged.
pub fn general_link(
    resolver: &mut Resolver<'_>,
    input: &FieldInput<'_>,
) -> Result<Resolved, FieldErrorKind> {
    let raw = input.raw();
    let Some(tag) = media_link().find(raw) else {
        return scalar(resolver, input);
    };

    let id_match = link_id()
        .captures(tag.as_str())
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| FieldErrorKind::UnexpectedFormat {
            field_type: input.field_type().to_string(),
        })?;
    let id = parse_id(id_match.as_str())?;
    let asset = extract_asset(resolver, &id)?;

    // Span of `{...}` in the raw value.
    let start = tag.start() + id_match.start() - 1;
    let end = tag.start() + id_match.end() + 1;
    let value = format!("{}{}{}", &raw[..start], asset.token(), &raw[end..]);

    Ok(Resolved::Asset { value, asset })
}

/// The value is a blob id; name and extension come from the owning item.
pub fn attachment(
    resolver: &mut Resolver<'_>,
    input: &FieldInput<'_>,
) -> Result<Resolved, FieldErrorKind> {
    let blob_id = parse_id(input.raw().trim())?;
    let item = input.item;
    let template = resolver
        .snapshot()
        .template_of(item)
        .ok_or(FieldErrorKind::TemplateNotFound(item.template_id))?;

    let (_, extension_field) = blob_fields(template, item.id)?;
    let language = resolver.language();
    let extension = item
        .field_value(&extension_field.id, language)
        .map(|v| v.value.clone())
        .unwrap_or_default();
    let attributes = custom_attributes(resolver.asset_settings(), template, item, language);

    let asset = AssetDescriptor::new(blob_id, item.id, &item.name, extension, &item.path, attributes);
    Ok(Resolved::Asset {
        value: asset.token(),
        asset,
    })
}

/// Build the asset descriptor for a media item in the reference lookup.
pub fn extract_asset(resolver: &Resolver<'_>, id: &ContentId) -> Result<AssetDescriptor, FieldErrorKind> {
    let snapshot = resolver.snapshot();
    let media = snapshot
        .reference(id)
        .ok_or(FieldErrorKind::ReferenceNotFound(*id))?;
    let template = snapshot
        .template_of(media)
        .ok_or(FieldErrorKind::TemplateNotFound(media.template_id))?;
    let (blob_field, extension_field) = blob_fields(template, media.id)?;

    let language = resolver.language();
    let attributes = custom_attributes(resolver.asset_settings(), template, media, language);

    let blob_value = media
        .field_value(&blob_field.id, language)
        .ok_or(FieldErrorKind::BlobValueMissing {
            item: media.id,
            field: blob_field.id,
        })?;
    let blob_id = blob_value
        .value
        .trim()
        .parse()
        .map_err(|_| FieldErrorKind::InvalidBlobId {
            item: media.id,
            value: blob_value.value.clone(),
        })?;
    let extension = media
        .field_value(&extension_field.id, language)
        .map(|v| v.value.clone())
        .unwrap_or_default();

    Ok(AssetDescriptor::new(
        blob_id,
        media.id,
        &media.name,
        extension,
        &media.path,
        attributes,
    ))
}

fn blob_fields(
    template: &Template,
    item: ContentId,
) -> Result<(&TemplateField, &TemplateField), FieldErrorKind> {
    match (template.find_field(BLOB_FIELD), template.find_field(EXTENSION_FIELD)) {
        (Some(blob), Some(extension)) => Ok((blob, extension)),
        (blob, extension) => Err(FieldErrorKind::AssetFieldsMissing {
            item,
            blob: blob.is_none(),
            extension: extension.is_none(),
        }),
    }
}

/// Configured custom fields present on the item; missing ones are skipped.
fn custom_attributes(
    settings: &AssetSettings,
    template: &Template,
    item: &Item,
    language: &str,
) -> Vec<Attribute> {
    settings
        .custom_fields
        .iter()
        .filter_map(|key| template.find_field(key))
        .filter_map(|field| {
            item.field_value(&field.id, language)
                .map(|v| Attribute::new(field.name.clone(), v.value.clone()))
        })
        .collect()
}
