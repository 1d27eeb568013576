use std::sync::OnceLock;

use regex::Regex;

use super::{extract_asset, media_tag, parse_id};
use crate::error::FieldErrorKind;
use crate::model::{union_assets, AssetDescriptor, Resolved};
use crate::resolver::{FieldInput, Resolver};

/// Inline media URL: `src="-/media/<32 hex>.ashx`.
fn media_url() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"src="-/media/([A-Fa-f0-9]{32})\.ashx"#).expect("valid media url pattern")
    })
}

/// Rewrite embedded media references to `blobref:` tokens.
///
/// A malformed id fails the field. A well-formed id that can't be turned
/// into an asset is recorded as a diagnostic and left untouched.
pub fn rich_text(
    resolver: &mut Resolver<'_>,
    input: &FieldInput<'_>,
) -> Result<Resolved, FieldErrorKind> {
    let raw = input.raw();
    let mut text = raw.to_string();
    let mut assets: Vec<AssetDescriptor> = Vec::new();

    for caps in media_tag().captures_iter(raw) {
        let tag = &caps[0];
        let raw_id = &caps[1];
        let id = parse_id(raw_id)?;
        match extract_asset(resolver, &id) {
            Ok(asset) => {
                let rewritten = tag.replacen(&format!("{{{}}}", raw_id), &asset.token(), 1);
                text = text.replace(tag, &rewritten);
                union_assets(&mut assets, std::slice::from_ref(&asset));
            }
            Err(kind) => resolver.warn(input, kind),
        }
    }

    for caps in media_url().captures_iter(raw) {
        let hex = &caps[1];
        let id = parse_id(hex)?;
        match extract_asset(resolver, &id) {
            Ok(asset) => {
                text = text.replace(&format!("-/media/{}.ashx", hex), &asset.token());
                union_assets(&mut assets, std::slice::from_ref(&asset));
            }
            Err(kind) => resolver.warn(input, kind),
        }
    }

    let text = resolver.registry().format(input.field_type(), text);
    Ok(Resolved::Html { text, assets })
}
