//! Field resolution and group assembly for cmsport.
//!
//! Turns the raw, typed field values of a [`Snapshot`](cmsport_store::Snapshot)
//! into an export-ready tree:
//!
//! - **Settings** ([`Settings`], [`TemplateSettings`], [`FieldSettings`], [`AssetSettings`]):
//!   which templates are exported, under which group name, with which fields
//! - **Resolution** ([`Resolver`], [`HandlerRegistry`]): type-dispatched, recursive
//!   field transformation that extracts asset descriptors as a side effect
//! - **Assembly** ([`assemble`]): folds resolved items into [`Group`]s
//!
//! # Example
//!
//! ```no_run
//! use cmsport_resolve::{assemble, HandlerRegistry, Settings};
//! use cmsport_store::Snapshot;
//!
//! # fn run(snapshot: &Snapshot, settings: &Settings) {
//! let registry = HandlerRegistry::standard();
//! let assembly = assemble(snapshot, settings, &registry);
//! for group in &assembly.groups {
//!     println!("{}: {} items, {} assets", group.name(), group.items().len(), group.assets().len());
//! }
//! # }
//! ```

mod assemble;
mod error;
mod format;
mod handlers;
mod model;
mod registry;
mod resolver;
mod settings;

#[cfg(test)]
mod testutil;

pub use assemble::{assemble, Assembly};
pub use error::{FieldError, FieldErrorKind, SettingsError};
pub use format::strip_empty_paragraphs;
pub use handlers::extract_asset;
pub use model::{AssetDescriptor, Attribute, Group, Resolved, ResolvedField, ResolvedItem};
pub use registry::{FieldHandler, HandlerRegistry, RegistryBuilder, TextFormatter};
pub use resolver::{FieldInput, Resolver};
pub use settings::{
    AssetSettings, BlobSettingsConfig, ExportSettings, FieldConfig, FieldProperties,
    FieldSettings, OutputSettings, PathFilter, PipelineSettings, Settings, TemplateConfig,
    TemplateSettings, PSEUDO_FIELDS,
};

/// Prefix of the indirection token substituted for asset references.
pub const BLOB_REF_PREFIX: &str = "blobref:";

/// Reference-field sentinel: emit the referenced item's name instead of resolving a field.
pub const ITEM_NAME_FIELD: &str = ":name";
