//! Ordered, concurrent rendition builds.
//!
//! Takes the source paths in command-line order and runs one
//! [`rendition::build`] task per path, all at once, on a dedicated rayon pool.
//! The returned [`GalleryManifest`] is always in input order regardless of
//! which task finishes first.
//!
//! ## Coordination
//!
//! ```text
//! paths ──enumerate──▶ spawn(build) ×N ──TaggedResult──▶ sync_channel(N)
//!                                                            │
//!                        join ─▶ drop sender ─▶ drain ─▶ reorder ─▶ manifest
//! ```
//!
//! - The result channel holds exactly N results, so no task ever blocks on
//!   send and none can be lost.
//! - Tasks share nothing mutable besides that channel (and the optional
//!   display channel). Every output they write has a distinct file name.
//! - Results are only read after every task has finished.
//! - A hard error from any task fails the whole run. The first one drained
//!   wins and the rest of the results are discarded. Siblings are not
//!   cancelled; they finish first (the staleness check keeps whatever they
//!   wrote cheap to reuse on the next run).
//! - Skipped sources produce no row, so the manifest can be shorter than the
//!   input.
//!
//! ## Pool width
//!
//! One worker per source by default, so every item is dispatched
//! immediately. `processing.max_workers` (or `--jobs`) narrows it for large
//! inputs, trading wall time for memory: every in-flight task holds a full
//! decoded raster.

use crate::config::GalleryConfig;
use crate::imaging::{ImageBackend, Quality, RustBackend};
use crate::profile::ItemTiming;
use crate::rendition::{self, BuildContext, BuildError, BuildOutcome};
use crate::staleness::RenditionStats;
use crate::types::{GalleryManifest, PixEntry, RenditionRecord};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("{source}")]
    Build { path: PathBuf, source: BuildError },
    #[error("no photos to process")]
    NoPhotos,
    #[error("could not start build workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Knobs that shape a run but not its output.
#[derive(Debug, Clone, Default)]
pub struct ProcessConfig {
    pub jpeg_quality: Quality,
    /// `None` means one worker per source.
    pub max_workers: Option<usize>,
}

impl ProcessConfig {
    pub fn from_gallery_config(config: &GalleryConfig) -> Self {
        Self {
            jpeg_quality: Quality::new(config.encoding.jpeg_quality),
            max_workers: config.processing.max_workers,
        }
    }
}

/// Progress notifications sent while tasks complete (in completion order).
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    Started {
        sources: usize,
        workers: usize,
    },
    Built {
        position: usize,
        source_path: String,
        renditions: Vec<RenditionRecord>,
    },
    Skipped {
        position: usize,
        source_path: String,
        reason: String,
    },
}

impl ProcessEvent {
    fn from_outcome(
        position: usize,
        path: &Path,
        outcome: &Result<BuildOutcome, BuildError>,
    ) -> Option<Self> {
        let source_path = path.display().to_string();
        match outcome {
            Ok(BuildOutcome::Built(built)) => Some(ProcessEvent::Built {
                position,
                source_path,
                renditions: vec![built.small.clone(), built.thumbnail.clone()],
            }),
            Ok(BuildOutcome::Skipped(reason)) => Some(ProcessEvent::Skipped {
                position,
                source_path,
                reason: reason.to_string(),
            }),
            Err(_) => None,
        }
    }
}

/// One task's completion, tagged with the input position it was built for.
#[derive(Debug)]
pub struct TaggedResult {
    pub position: usize,
    pub path: PathBuf,
    pub outcome: Result<BuildOutcome, BuildError>,
}

#[derive(Debug)]
pub struct ProcessResult {
    pub manifest: GalleryManifest,
    pub stats: RenditionStats,
    /// Per-source phase timings, in input order.
    pub timings: Vec<ItemTiming>,
    pub workers: usize,
    pub elapsed: Duration,
}

/// Build every source with the production backend.
pub fn run(
    paths: &[PathBuf],
    ctx: &BuildContext,
    config: &ProcessConfig,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::with_quality(config.jpeg_quality);
    run_with_backend(&backend, paths, ctx, config.max_workers, events)
}

/// Build every source using a specific backend (allows testing with mock).
pub fn run_with_backend(
    backend: &impl ImageBackend,
    paths: &[PathBuf],
    ctx: &BuildContext,
    max_workers: Option<usize>,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    if paths.is_empty() {
        return Err(ProcessError::NoPhotos);
    }
    let started = Instant::now();
    let workers = effective_workers(paths.len(), max_workers);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("build-{i}"))
        .build()?;

    info!("building {} sources on {} workers", paths.len(), workers);
    if let Some(events) = &events {
        let _ = events.send(ProcessEvent::Started {
            sources: paths.len(),
            workers,
        });
    }

    let (tx, rx) = mpsc::sync_channel::<TaggedResult>(paths.len());
    pool.scope(|scope| {
        for (position, path) in paths.iter().enumerate() {
            let tx = tx.clone();
            let events = events.clone();
            scope.spawn(move |_| {
                let outcome = rendition::build(path, position, backend, ctx);
                if let Some(events) = &events {
                    if let Some(event) = ProcessEvent::from_outcome(position, path, &outcome) {
                        let _ = events.send(event);
                    }
                }
                // Capacity equals the task count: never blocks, never drops
                let _ = tx.send(TaggedResult {
                    position,
                    path: path.clone(),
                    outcome,
                });
            });
        }
    });
    drop(tx);

    let mut stats = RenditionStats::default();
    let mut rows = Vec::with_capacity(paths.len());
    let mut timings = Vec::with_capacity(paths.len());
    for tagged in rx {
        match tagged.outcome {
            Ok(BuildOutcome::Built(built)) => {
                stats.record(built.small.status);
                stats.record(built.thumbnail.status);
                timings.push(ItemTiming::new(
                    tagged.position,
                    &built.entry.filename,
                    &built.timings,
                ));
                rows.push((tagged.position, built.entry));
            }
            Ok(BuildOutcome::Skipped(reason)) => {
                debug!("{} not processed: {}", tagged.path.display(), reason);
            }
            Err(source) => {
                return Err(ProcessError::Build {
                    path: tagged.path,
                    source,
                });
            }
        }
    }

    let manifest = reorder(rows);
    if manifest.is_empty() {
        return Err(ProcessError::NoPhotos);
    }
    timings.sort_by_key(|t| t.position);

    Ok(ProcessResult {
        manifest,
        stats,
        timings,
        workers,
        elapsed: started.elapsed(),
    })
}

/// Restore input order from completion order.
///
/// Rows are sorted by their input position; positions of skipped sources are
/// simply absent, so the result is dense.
pub fn reorder(mut rows: Vec<(usize, PixEntry)>) -> GalleryManifest {
    rows.sort_by_key(|(position, _)| *position);
    rows.into_iter().map(|(_, entry)| entry).collect()
}

/// Pool width for `sources` items: one each, optionally capped.
pub fn effective_workers(sources: usize, max_workers: Option<usize>) -> usize {
    let all = sources.max(1);
    max_workers.map(|n| n.clamp(1, all)).unwrap_or(all)
}
