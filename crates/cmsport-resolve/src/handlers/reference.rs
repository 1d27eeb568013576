use cmsport_store::Item;

use super::{id_tokens, parse_id};
use crate::error::FieldErrorKind;
use crate::model::{union_assets, Resolved, ResolvedField, ResolvedItem};
use crate::resolver::{FieldInput, Resolver};

/// `|`-separated references. Bad entries are skipped with a diagnostic.
pub fn reference_list(
    resolver: &mut Resolver<'_>,
    input: &FieldInput<'_>,
) -> Result<Resolved, FieldErrorKind> {
    let snapshot = resolver.snapshot();
    let mut items = Vec::new();
    let mut assets = Vec::new();

    for token in id_tokens(input.raw()) {
        let id = match parse_id(token) {
            Ok(id) => id,
            Err(kind) => {
                resolver.warn(input, kind);
                continue;
            }
        };
        let Some(target) = snapshot.reference(&id) else {
            resolver.warn(input, FieldErrorKind::ReferenceNotFound(id));
            continue;
        };
        match resolve_reference(resolver, input, target) {
            Ok(item) => {
                union_assets(&mut assets, &item.assets);
                items.push(item);
            }
            Err(kind) => resolver.warn(input, kind),
        }
    }

    Ok(Resolved::References { items, assets })
}

/// Exactly one reference; anything else fails the field.
pub fn single_reference(
    resolver: &mut Resolver<'_>,
    input: &FieldInput<'_>,
) -> Result<Resolved, FieldErrorKind> {
    let tokens: Vec<&str> = id_tokens(input.raw()).collect();
    let token = match tokens.as_slice() {
        [] => return Ok(Resolved::Empty),
        [token] => *token,
        many => return Err(FieldErrorKind::MultipleReferences(many.len())),
    };

    let id = parse_id(token)?;
    let target = resolver
        .snapshot()
        .reference(&id)
        .ok_or(FieldErrorKind::ReferenceNotFound(id))?;
    let item = resolve_reference(resolver, input, target)?;
    let assets = item.assets.clone();
    Ok(Resolved::References {
        items: vec![item],
        assets,
    })
}

/// Describe a referenced item, resolving the configured field on it unless
/// the field settings ask for the bare item.
fn resolve_reference(
    resolver: &mut Resolver<'_>,
    input: &FieldInput<'_>,
    target: &Item,
) -> Result<ResolvedItem, FieldErrorKind> {
    let mut item = ResolvedItem::describe(target);
    let ref_field = match input.settings.ref_field.as_deref() {
        Some(name) if !input.settings.uses_item_name() => name,
        _ => return Ok(item),
    };

    if resolver.is_visiting(&target.id) {
        return Err(FieldErrorKind::ReferenceCycle(target.id));
    }

    let snapshot = resolver.snapshot();
    let template = snapshot
        .template_of(target)
        .ok_or(FieldErrorKind::TemplateNotFound(target.template_id))?;
    let field = template
        .find_field(ref_field)
        .ok_or_else(|| FieldErrorKind::RefFieldNotFound {
            field: ref_field.to_string(),
            template: template.name.clone(),
            template_id: template.id,
        })?;

    let Some(value) = snapshot.field_value_or_default(target, &field.id, resolver.language()) else {
        tracing::debug!(item = %target.id, field = %field.name, "referenced item has no value");
        return Ok(item);
    };

    let nested = FieldInput {
        value,
        field,
        item: target,
        settings: input.settings,
    };
    let resolved = resolver
        .resolve(&nested)
        .map_err(|err| FieldErrorKind::Reference(Box::new(err)))?;
    item.push_field(ResolvedField::new(field.name.clone(), resolved));
    Ok(item)
}
