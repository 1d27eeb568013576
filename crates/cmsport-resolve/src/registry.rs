//! Field type name to handler dispatch.

use cmsport_store::FxHashMap;

use crate::error::FieldErrorKind;
use crate::format::strip_empty_paragraphs;
use crate::handlers;
use crate::model::Resolved;
use crate::resolver::{FieldInput, Resolver};

/// Transforms one raw field value.
pub type FieldHandler = fn(&mut Resolver<'_>, &FieldInput<'_>) -> Result<Resolved, FieldErrorKind>;

/// Normalizes rich text of one field type.
pub type TextFormatter = fn(&str) -> String;

const SCALAR_TYPES: &[&str] = &[
    "Single-Line Text",
    "text",
    "Datetime",
    "Date",
    "Integer",
    "Number",
    "Checkbox",
];
const RICH_TEXT_TYPES: &[&str] = &["Rich Text", "Multi-Line Text"];
const SINGLE_REFERENCE_TYPES: &[&str] = &["Droplink", "Droptree", "Grouped Droplink"];
const REFERENCE_LIST_TYPES: &[&str] = &[
    "Treelist",
    "TreelistEx",
    "MultiRoot Treelist",
    "Multilist",
    "Multilist with Search",
    "Checklist",
];
const MEDIA_TYPES: &[&str] = &["Image", "File"];
const ATTACHMENT_TYPES: &[&str] = &["attachment", "Attachment"];

/// Immutable handler table, built once per run.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: FxHashMap<String, FieldHandler>,
    formatters: FxHashMap<String, TextFormatter>,
    fallback: FieldHandler,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().collect();
        types.sort();
        f.debug_struct("HandlerRegistry")
            .field("types", &types)
            .field("formatters", &self.formatters.len())
            .finish()
    }
}

impl HandlerRegistry {
    /// The built-in handlers and formatters.
    pub fn standard() -> Self {
        Self::builder().with_standard_handlers().build()
    }

    /// An empty registry whose fallback is the scalar handler.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder {
            handlers: FxHashMap::default(),
            formatters: FxHashMap::default(),
            fallback: handlers::scalar,
        }
    }

    /// Handler for a type name; unknown names get the fallback.
    pub fn handler(&self, type_name: &str) -> FieldHandler {
        self.handlers.get(type_name).copied().unwrap_or(self.fallback)
    }

    #[inline]
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.handlers.contains_key(type_name)
    }

    /// Apply the formatter registered for a type name, if any.
    pub fn format(&self, type_name: &str, text: String) -> String {
        match self.formatters.get(type_name) {
            Some(formatter) => formatter(&text),
            None => text,
        }
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Builder for [`HandlerRegistry`].
pub struct RegistryBuilder {
    handlers: FxHashMap<String, FieldHandler>,
    formatters: FxHashMap<String, TextFormatter>,
    fallback: FieldHandler,
}

impl RegistryBuilder {
    /// Register every built-in handler and formatter.
    pub fn with_standard_handlers(self) -> Self {
        let mut builder = self;
        let table: [(&[&str], FieldHandler); 6] = [
            (SCALAR_TYPES, handlers::scalar),
            (RICH_TEXT_TYPES, handlers::rich_text),
            (SINGLE_REFERENCE_TYPES, handlers::single_reference),
            (REFERENCE_LIST_TYPES, handlers::reference_list),
            (MEDIA_TYPES, handlers::media),
            (ATTACHMENT_TYPES, handlers::attachment),
        ];
        for (types, handler) in table {
            for type_name in types {
                builder = builder.handler(*type_name, handler);
            }
        }
        builder
            .handler("General Link", handlers::general_link)
            .formatter("Rich Text", strip_empty_paragraphs)
    }

    /// Register (or replace) the handler for a type name.
    pub fn handler(mut self, type_name: impl Into<String>, handler: FieldHandler) -> Self {
        self.handlers.insert(type_name.into(), handler);
        self
    }

    pub fn formatter(mut self, type_name: impl Into<String>, formatter: TextFormatter) -> Self {
        self.formatters.insert(type_name.into(), formatter);
        self
    }

    /// Handler for unregistered type names.
    pub fn fallback(mut self, handler: FieldHandler) -> Self {
        self.fallback = handler;
        self
    }

    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
            formatters: self.formatters,
            fallback: self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_types() {
        let registry = HandlerRegistry::standard();
        for name in ["Rich Text", "Treelist", "Droplink", "Image", "General Link", "attachment"] {
            assert!(registry.is_registered(name), "{name} should be registered");
        }
        assert!(!registry.is_registered("Totally Custom"));
    }

    #[test]
    fn test_formatter_only_for_rich_text() {
        let registry = HandlerRegistry::standard();
        let text = "<p> </p>\n<p>x</p>".to_string();
        assert_eq!(registry.format("Rich Text", text.clone()), "<p>x</p>");
        assert_eq!(registry.format("Multi-Line Text", text.clone()), text);
    }
}
