//! Content store snapshot model for cmsport.
//!
//! The store itself (its storage engine and bulk-load API) lives outside this
//! workspace. This crate describes what cmsport needs from it:
//!
//! - **Model** ([`Item`], [`Template`], [`TemplateField`], [`FieldValue`]): read-only
//!   snapshot entities as the loader hands them over
//! - **Snapshot** ([`Snapshot`], [`SnapshotBuilder`]): the report item list plus the
//!   item and reference lookups used while resolving fields
//! - **Sources** ([`ContentStore`], [`BlobSource`]): the bulk-load and blob retrieval
//!   contract, with [`MemoryStore`] and [`JsonStore`] implementations
//!
//! # Example
//!
//! ```no_run
//! use cmsport_store::{ContentStore, JsonStore};
//!
//! let store = JsonStore::open("dump.json", None)?;
//! let templates = store.load_templates()?;
//! println!("Templates: {}", templates.len());
//! # Ok::<(), cmsport_store::Error>(())
//! ```

mod error;
mod json;
mod memory;
mod model;
mod snapshot;
mod source;

pub use error::{Error, Result};
pub use json::{JsonStore, StoreDump};
pub use memory::MemoryStore;
pub use model::{FieldValue, Item, Template, TemplateField};
pub use snapshot::{FxHashMap, FxHashSet, ItemMap, Snapshot, SnapshotBuilder};
pub use source::{BlobSource, ContentStore};

pub use cmsport_common::ContentId;

/// Name of the template field holding a media item's blob id.
pub const BLOB_FIELD: &str = "Blob";

/// Name of the template field holding a media item's file extension.
pub const EXTENSION_FIELD: &str = "Extension";
