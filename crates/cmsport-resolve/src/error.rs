//! Error types for settings and field resolution.

use std::path::PathBuf;

use cmsport_common::ContentId;
use thiserror::Error;

/// What went wrong while resolving one field.
#[derive(Debug, Error)]
pub enum FieldErrorKind {
    /// An identifier in the field value did not parse.
    #[error("couldn't parse id {value:?}")]
    MalformedId { value: String },

    /// A referenced item is missing from the reference lookup.
    #[error("referenced item not found {0}")]
    ReferenceNotFound(ContentId),

    /// Following references led back to an item already being resolved.
    #[error("reference cycle through item {0}")]
    ReferenceCycle(ContentId),

    /// A single-reference field names more than one item.
    #[error("single reference field holds {0} ids")]
    MultipleReferences(usize),

    /// The configured reference field does not exist on the referenced item's template.
    #[error("couldn't find field {field} on template {template} ({template_id})")]
    RefFieldNotFound {
        field: String,
        template: String,
        template_id: ContentId,
    },

    /// An item's template is missing from the snapshot.
    #[error("template not found {0}")]
    TemplateNotFound(ContentId),

    /// A media item's template lacks the blob or extension field.
    #[error("blob fields not found on {item} (Blob missing: {blob}, Extension missing: {extension})")]
    AssetFieldsMissing {
        item: ContentId,
        blob: bool,
        extension: bool,
    },

    /// A media item has no blob id value.
    #[error("no blob id value on media item {item}, field id is {field}")]
    BlobValueMissing { item: ContentId, field: ContentId },

    /// A media item's blob id value did not parse.
    #[error("blob field on media item {item} is invalid format {value:?}")]
    InvalidBlobId { item: ContentId, value: String },

    /// The value does not follow the markup grammar of its field type.
    #[error("{field_type} field not in expected format")]
    UnexpectedFormat { field_type: String },

    /// Resolving the field on a referenced item failed.
    #[error("in referenced item: {0}")]
    Reference(Box<FieldError>),
}

/// A field-scoped resolution failure, annotated with the field's identity.
///
/// Never fatal for a run: the assembler logs it and skips the field.
#[derive(Debug, Error)]
#[error("couldn't resolve field {field_name} (id: {field_id}) on item {item_name} (id: {item_id}), value {value:?}: {kind}")]
pub struct FieldError {
    pub item_id: ContentId,
    pub item_name: String,
    pub field_id: ContentId,
    pub field_name: String,
    /// Raw value, truncated for logging.
    pub value: String,
    #[source]
    pub kind: FieldErrorKind,
}

/// Errors in the export settings. Always fatal.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("can't read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// A template id did not parse.
    #[error("can't parse template id {value:?} for {name}: {source}")]
    InvalidTemplateId {
        name: String,
        value: String,
        #[source]
        source: cmsport_common::Error,
    },

    /// The same template id is configured twice in one list.
    #[error("template {0} configured more than once")]
    DuplicateTemplate(ContentId),

    /// A path filter is not a valid glob pattern.
    #[error("invalid path filter {pattern:?}: {source}")]
    InvalidPathFilter {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// A field entry has no name.
    #[error("field without a name on template {0}")]
    UnnamedField(String),

    /// A `:`-prefixed field name that names no item property.
    #[error("unknown pseudo-field {field} on template {template}")]
    UnknownPseudoField { template: String, field: String },
}
