//! Blob extraction for cmsport.
//!
//! Takes the asset descriptors gathered during assembly, fetches each payload
//! from a [`BlobSource`](cmsport_store::BlobSource), and persists it as a
//! blob container. Fetching runs on a sharded worker pool, persisting on a
//! separate pool fed through a bounded queue, and every failure is reported
//! without stopping the rest of the run.
//!
//! # Example
//!
//! ```no_run
//! use cmsport_blobs::{collect_assets, BlobPipeline, PipelineConfig};
//! use cmsport_resolve::Group;
//! use cmsport_store::MemoryStore;
//!
//! # fn run(groups: &[Group], store: &MemoryStore) -> Result<(), cmsport_blobs::BlobError> {
//! let assets = collect_assets(groups);
//! let pipeline = BlobPipeline::new(store, PipelineConfig::new("out/blobs"));
//! let report = pipeline.run(&assets, |done, total| eprintln!("{done}/{total}"))?;
//! println!("wrote {} blobs, {} failed", report.stats.written, report.stats.failed);
//! # Ok(())
//! # }
//! ```

mod error;
mod pipeline;

pub use error::BlobError;
pub use pipeline::{BlobPipeline, PipelineConfig, PipelineReport, PipelineStats};

use cmsport_resolve::{AssetDescriptor, Group};
use cmsport_store::FxHashSet;

/// Every distinct asset across the groups, keyed by filename.
///
/// The first descriptor seen for a filename wins, in group order.
pub fn collect_assets(groups: &[Group]) -> Vec<AssetDescriptor> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut assets = Vec::new();
    for group in groups {
        for asset in group.assets() {
            if seen.insert(asset.filename.as_str()) {
                assets.push(asset.clone());
            }
        }
    }
    assets
}
