//! cmsport - export CMS content trees and their media blobs.
//!
//! This crate ties the cmsport workspace together and adds the pieces that
//! run around the core: the snapshot loader, the tool configuration and the
//! last-run marker.
//!
//! # Crates
//!
//! - [`cmsport_common`] - Content identifiers
//! - [`cmsport_store`] - Snapshot model and store adapters
//! - [`cmsport_resolve`] - Settings, field resolution and group assembly
//! - [`cmsport_output`] - XML/JSON group documents and blob containers
//! - [`cmsport_blobs`] - Concurrent blob extraction
//!
//! # Example
//!
//! ```no_run
//! use cmsport::prelude::*;
//!
//! let settings = ExportSettings::load("settings.json")?;
//! let mapping = settings.build()?;
//! let store = JsonStore::open("dump.json", None)?;
//!
//! let snapshot = load_snapshot(&store, &mapping, None)?;
//! let assembly = assemble(&snapshot, &mapping, &HandlerRegistry::standard());
//! write_groups(&assembly.groups, "out/content", ContentFormat::Xml)?;
//!
//! let assets = collect_assets(&assembly.groups);
//! let report = BlobPipeline::new(&store, PipelineConfig::new("out/blobs")).run(&assets, |_, _| {})?;
//! println!("Blobs written: {}", report.stats.written);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod lastmod;
mod loader;

pub use cmsport_blobs as blobs;
pub use cmsport_common as common;
pub use cmsport_output as output;
pub use cmsport_resolve as resolve;
pub use cmsport_store as store;

pub use config::{ConfigError, ToolConfig};
pub use lastmod::{format_lastmod, lastmod_path, read_lastmod, write_lastmod, LASTMOD_FORMAT};
pub use loader::{load_snapshot, LoadError, FIELD_BATCH_SIZE};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use cmsport_blobs::{collect_assets, BlobPipeline, PipelineConfig, PipelineStats};
    pub use cmsport_common::ContentId;
    pub use cmsport_output::{write_groups, BlobContainer, ContentFormat};
    pub use cmsport_resolve::{assemble, Assembly, ExportSettings, HandlerRegistry, Settings};
    pub use cmsport_store::{BlobSource, ContentStore, JsonStore, MemoryStore, Snapshot};

    pub use crate::{load_snapshot, ToolConfig};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
