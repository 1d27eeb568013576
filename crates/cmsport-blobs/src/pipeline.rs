//! Two-stage fetch/persist pipeline.
//!
//! ```text
//!  descriptors ──shard──► fetch pool (rayon) ──bounded queue──► persist workers ──► containers
//!                              │                                      │
//!                              └────────────► error channel ◄────────┘
//!                                                  │
//!                                               sink (logs)
//! ```
//!
//! Shutdown is a strict two-phase barrier: the fetch pool finishes and the
//! payload sender is dropped, the persist workers drain the queue and exit,
//! then the error channel closes and the sink returns what it collected.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use cmsport_output::{container_path, BlobContainer};
use cmsport_resolve::{AssetDescriptor, PipelineSettings};
use cmsport_store::BlobSource;
use crossbeam_channel::{Receiver, Sender};
use rayon::prelude::*;

use crate::BlobError;

/// Pipeline sizing and destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Threads fetching payloads; also the number of shards.
    pub fetch_workers: usize,
    /// Threads writing containers.
    pub persist_workers: usize,
    /// Payloads buffered between the two stages.
    pub queue_capacity: usize,
    /// Directory receiving the containers.
    pub destination: PathBuf,
}

impl PipelineConfig {
    pub fn new(destination: impl Into<PathBuf>) -> Self {
        Self::from_settings(&PipelineSettings::default(), destination)
    }

    pub fn from_settings(settings: &PipelineSettings, destination: impl Into<PathBuf>) -> Self {
        Self {
            fetch_workers: settings.fetch_workers,
            persist_workers: settings.persist_workers,
            queue_capacity: settings.queue_capacity,
            destination: destination.into(),
        }
    }

    pub fn with_workers(mut self, fetch: usize, persist: usize) -> Self {
        self.fetch_workers = fetch;
        self.persist_workers = persist;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

/// Counters from one pipeline run.
///
/// `total == skipped + fetched + fetch failures` and
/// `fetched == written + persist failures`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Descriptors handed to the pipeline.
    pub total: usize,
    /// Already present at the destination.
    pub skipped: usize,
    /// Payloads loaded from the store.
    pub fetched: usize,
    /// Containers written.
    pub written: usize,
    /// Fetch and persist failures.
    pub failed: usize,
}

impl PipelineStats {
    /// Check if every descriptor ended up on disk.
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.skipped + self.written == self.total
    }
}

/// Outcome of a run: counters plus every error the sink collected.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub stats: PipelineStats,
    pub errors: Vec<BlobError>,
}

/// A fetched payload on its way to a persist worker.
struct Payload<'a> {
    asset: &'a AssetDescriptor,
    data: Vec<u8>,
}

#[derive(Default)]
struct Counters {
    skipped: AtomicUsize,
    fetched: AtomicUsize,
    written: AtomicUsize,
    failed: AtomicUsize,
    done: AtomicUsize,
}

impl Counters {
    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one descriptor as finished and return how many are.
    fn finish(&self) -> usize {
        self.done.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn stats(&self, total: usize) -> PipelineStats {
        PipelineStats {
            total,
            skipped: self.skipped.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Concurrent blob extractor over a [`BlobSource`].
pub struct BlobPipeline<'s, S: BlobSource + ?Sized> {
    source: &'s S,
    config: PipelineConfig,
}

impl<'s, S: BlobSource + ?Sized> BlobPipeline<'s, S> {
    pub fn new(source: &'s S, config: PipelineConfig) -> Self {
        Self { source, config }
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch and persist every descriptor.
    ///
    /// Descriptors whose container already exists are skipped. Individual
    /// failures are logged and collected; only a pool that can't start is
    /// an `Err`. The progress callback receives (finished, total) counts
    /// and is called from worker threads.
    pub fn run<F>(&self, assets: &[AssetDescriptor], progress: F) -> Result<PipelineReport, BlobError>
    where
        F: Fn(usize, usize) + Sync,
    {
        let total = assets.len();
        if total == 0 {
            return Ok(PipelineReport::default());
        }

        let fetch_workers = self.config.fetch_workers.max(1);
        let persist_workers = self.config.persist_workers.max(1);
        let shard_size = total.div_ceil(fetch_workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(fetch_workers)
            .thread_name(|i| format!("blob-fetch-{}", i))
            .build()?;

        let destination = self.config.destination.as_path();
        let counters = Counters::default();
        let (payload_tx, payload_rx) = crossbeam_channel::bounded(self.config.queue_capacity.max(1));
        let (error_tx, error_rx) = crossbeam_channel::unbounded();

        tracing::info!(
            total,
            shards = total.div_ceil(shard_size),
            fetch_workers,
            persist_workers,
            destination = %destination.display(),
            "extracting blobs"
        );

        let errors = std::thread::scope(|scope| {
            let sink = scope.spawn(move || drain_errors(error_rx));

            let persisters: Vec<_> = (0..persist_workers)
                .map(|_| {
                    let payloads = payload_rx.clone();
                    let errors = error_tx.clone();
                    let counters = &counters;
                    let progress = &progress;
                    scope.spawn(move || {
                        persist_loop(payloads, errors, destination, counters, progress, total)
                    })
                })
                .collect();
            drop(payload_rx);

            pool.install(|| {
                assets.par_chunks(shard_size).for_each(|shard| {
                    for asset in shard {
                        self.fetch(asset, &payload_tx, &error_tx, &counters, &progress, total);
                    }
                });
            });

            // Phase one: no more payloads.
            drop(payload_tx);
            for handle in persisters {
                if handle.join().is_err() {
                    tracing::error!("persist worker panicked");
                }
            }

            // Phase two: no more errors.
            drop(error_tx);
            sink.join().unwrap_or_default()
        });

        let stats = counters.stats(total);
        tracing::info!(
            total = stats.total,
            skipped = stats.skipped,
            written = stats.written,
            failed = stats.failed,
            "blob extraction finished"
        );
        Ok(PipelineReport { stats, errors })
    }

    fn fetch<'a, F>(
        &self,
        asset: &'a AssetDescriptor,
        payloads: &Sender<Payload<'a>>,
        errors: &Sender<BlobError>,
        counters: &Counters,
        progress: &F,
        total: usize,
    ) where
        F: Fn(usize, usize) + Sync,
    {
        let container = container_path(&self.config.destination, &asset.filename);
        if container.exists() {
            tracing::debug!(filename = %asset.filename, "container exists, skipping");
            Counters::bump(&counters.skipped);
            progress(counters.finish(), total);
            return;
        }

        match self.source.load_blob(&asset.blob_id) {
            Ok(data) => {
                Counters::bump(&counters.fetched);
                if !enqueue(payloads, errors, Payload { asset, data }) {
                    Counters::bump(&counters.failed);
                    progress(counters.finish(), total);
                }
            }
            Err(source) => {
                Counters::bump(&counters.failed);
                let _ = errors.send(BlobError::Fetch {
                    blob: asset.blob_id,
                    filename: asset.filename.clone(),
                    source,
                });
                progress(counters.finish(), total);
            }
        }
    }
}

/// Hand a payload to the persist workers. Returns false when none are left.
fn enqueue<'a>(
    payloads: &Sender<Payload<'a>>,
    errors: &Sender<BlobError>,
    payload: Payload<'a>,
) -> bool {
    match payloads.send(payload) {
        Ok(()) => true,
        Err(err) => {
            let payload = err.into_inner();
            let _ = errors.send(BlobError::QueueClosed {
                filename: payload.asset.filename.clone(),
            });
            false
        }
    }
}

fn persist_loop<F>(
    payloads: Receiver<Payload<'_>>,
    errors: Sender<BlobError>,
    destination: &Path,
    counters: &Counters,
    progress: &F,
    total: usize,
) where
    F: Fn(usize, usize) + Sync,
{
    for payload in payloads {
        let container = BlobContainer::new(payload.asset, &payload.data);
        match container.persist(destination) {
            Ok(path) => {
                tracing::trace!(path = %path.display(), bytes = payload.data.len(), "wrote container");
                Counters::bump(&counters.written);
            }
            Err(source) => {
                Counters::bump(&counters.failed);
                let _ = errors.send(BlobError::Persist {
                    filename: payload.asset.filename.clone(),
                    source,
                });
            }
        }
        progress(counters.finish(), total);
    }
}

fn drain_errors(errors: Receiver<BlobError>) -> Vec<BlobError> {
    let mut collected = Vec::new();
    for err in errors {
        tracing::error!("{}", err);
        collected.push(err);
    }
    collected
}
