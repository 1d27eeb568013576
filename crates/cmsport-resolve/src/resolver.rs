//! Recursive, type-dispatched field resolution.

use cmsport_common::{short_value, ContentId};
use cmsport_store::{FieldValue, Item, Snapshot, TemplateField};

use crate::error::{FieldError, FieldErrorKind};
use crate::handlers;
use crate::model::Resolved;
use crate::registry::{FieldHandler, HandlerRegistry};
use crate::settings::{AssetSettings, FieldSettings};

/// One field value to resolve, with everything that identifies it.
#[derive(Debug, Clone, Copy)]
pub struct FieldInput<'a> {
    pub value: &'a FieldValue,
    pub field: &'a TemplateField,
    pub item: &'a Item,
    pub settings: &'a FieldSettings,
}

impl<'a> FieldInput<'a> {
    #[inline]
    pub fn raw(&self) -> &'a str {
        &self.value.value
    }

    #[inline]
    pub fn field_type(&self) -> &'a str {
        &self.field.field_type
    }

    /// Wrap a failure with this field's identity.
    pub fn error(&self, kind: FieldErrorKind) -> FieldError {
        FieldError {
            item_id: self.item.id,
            item_name: self.item.name.clone(),
            field_id: self.field.id,
            field_name: self.field.name.clone(),
            value: short_value(self.raw()),
            kind,
        }
    }
}

/// Resolution context for one run over a snapshot.
///
/// Holds the stack of items currently being resolved, so reference chains
/// that loop back fail with [`FieldErrorKind::ReferenceCycle`] instead of
/// recursing forever, and collects non-fatal diagnostics.
pub struct Resolver<'a> {
    registry: &'a HandlerRegistry,
    snapshot: &'a Snapshot,
    assets: &'a AssetSettings,
    language: &'a str,
    visiting: Vec<ContentId>,
    diagnostics: Vec<FieldError>,
}

impl<'a> Resolver<'a> {
    pub fn new(
        registry: &'a HandlerRegistry,
        snapshot: &'a Snapshot,
        assets: &'a AssetSettings,
        language: &'a str,
    ) -> Self {
        Self {
            registry,
            snapshot,
            assets,
            language,
            visiting: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    #[inline]
    pub fn registry(&self) -> &'a HandlerRegistry {
        self.registry
    }

    #[inline]
    pub fn asset_settings(&self) -> &'a AssetSettings {
        self.assets
    }

    #[inline]
    pub fn language(&self) -> &'a str {
        self.language
    }

    /// Whether an item is somewhere up the current resolution chain.
    pub fn is_visiting(&self, id: &ContentId) -> bool {
        self.visiting.contains(id)
    }

    /// Resolve one field value.
    ///
    /// The `blob` property routes the value to the attachment handler, the
    /// `html` property forces an HTML rendition of the result.
    pub fn resolve(&mut self, input: &FieldInput<'_>) -> Result<Resolved, FieldError> {
        let handler: FieldHandler = if input.settings.properties.blob {
            handlers::attachment
        } else {
            self.registry.handler(input.field_type())
        };

        self.visiting.push(input.item.id);
        let result = handler(self, input);
        self.visiting.pop();

        let resolved = result.map_err(|kind| input.error(kind))?;
        if input.settings.properties.html {
            Ok(resolved.into_html())
        } else {
            Ok(resolved)
        }
    }

    /// Record a non-fatal problem and keep going.
    pub fn warn(&mut self, input: &FieldInput<'_>, kind: FieldErrorKind) {
        let diagnostic = input.error(kind);
        tracing::warn!(item = %input.item.id, field = %input.field.name, "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    #[inline]
    pub fn diagnostics(&self) -> &[FieldError] {
        &self.diagnostics
    }

    /// Drain diagnostics recorded so far.
    pub fn take_diagnostics(&mut self) -> Vec<FieldError> {
        std::mem::take(&mut self.diagnostics)
    }
}
