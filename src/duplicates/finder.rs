//! Duplicate finder implementation with multi-stage detection.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Candidate selection**: keep size buckets with 2+ files (see [`crate::duplicates::groups`])
//! 2. **Quick hash**: fast head/tail digest of every candidate
//! 3. **Full hash**: strong whole-content digest of quick-hash survivors
//! 4. **Report**: confirmed groups with wasted space (see [`crate::duplicates::report`])
//!
//! Each hashing stage is a bounded worker pool ([`crate::duplicates::pool`]).
//! A stage finishes completely before the next one starts, because the full
//! hash input is only known once every quick digest has been aggregated.
//!
//! # Example
//!
//! ```no_run
//! use dupescout::duplicates::{group_by_size, DuplicateFinder, FinderConfig, Stats};
//! use dupescout::scanner::FileRecord;
//!
//! let buckets = group_by_size(vec![
//!     FileRecord::new("/tmp/a.txt", 42),
//!     FileRecord::new("/tmp/b.txt", 42),
//! ]);
//!
//! let stats = Stats::new();
//! let finder = DuplicateFinder::new(FinderConfig::default().with_workers(4));
//! let report = finder.find(buckets, &stats).unwrap();
//! println!("{} groups, {} bytes reclaimable", report.groups.len(), report.total_wasted_space);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::progress::ProgressCallback;
use crate::scanner::{
    hash_to_hex, Blake3Hasher, FileRecord, FullDigest, FullHash, QuickDigest, XxQuickHasher,
};

use super::groups::{select_candidates, validate_buckets, SizeBuckets};
use super::pool::run_pool;
use super::report::{assemble_report, DuplicateReport};
use super::Stats;

/// Files larger than this are logged when fully hashed.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024; // 100MB

/// Phase name reported to progress callbacks for the quick-hash stage.
pub const QUICK_HASH_PHASE: &str = "quick_hash";

/// Phase name reported to progress callbacks for the full-hash stage.
pub const FULL_HASH_PHASE: &str = "full_hash";

/// Default worker count: one per available CPU.
#[must_use]
pub fn default_workers() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

/// Errors that make an engine run meaningless.
///
/// Per-file failures are never reported here; they are counted in
/// [`Stats`] and logged.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The worker count was zero.
    #[error("Worker count must be at least 1")]
    InvalidWorkerCount,

    /// A size bucket contained a record of a different size.
    #[error("Bucket for size {size} contains {path} with size {actual}")]
    BucketSizeMismatch {
        /// The bucket's size key
        size: u64,
        /// The offending record
        path: PathBuf,
        /// The record's actual size
        actual: u64,
    },

    /// The hashing thread pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Grouping key after the quick-hash stage.
///
/// Size is part of the key so that files which agree only at head and tail
/// are never grouped across buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QuickKey {
    /// File size in bytes
    pub size: u64,
    /// Quick digest value
    pub digest: u64,
}

/// Grouping key after the full-hash stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullKey {
    /// File size in bytes
    pub size: u64,
    /// Full digest bytes
    pub digest: FullHash,
}

/// A candidate with its quick digest.
#[derive(Debug, Clone)]
struct QuickHashResult {
    record: FileRecord,
    digest: u64,
}

/// A survivor with its full digest.
#[derive(Debug, Clone)]
struct FullHashResult {
    record: FileRecord,
    digest: FullHash,
}

/// Settings shared by both hashing stages.
#[derive(Clone)]
pub struct StageConfig {
    /// Number of workers (and pool threads) for the stage.
    pub workers: usize,
    /// Optional shutdown flag; workers stop pulling work once it is set.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for StageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageConfig")
            .field("workers", &self.workers)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl StageConfig {
    /// Set the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn progress(&self) -> Option<&dyn ProgressCallback> {
        self.progress_callback.as_deref()
    }
}

/// Output of the quick-hash stage.
#[derive(Debug, Default)]
pub struct QuickHashOutput {
    /// Every digest group, including singletons.
    pub groups: HashMap<QuickKey, Vec<FileRecord>>,
    /// Whether the stage stopped early on a shutdown request.
    pub interrupted: bool,
}

impl QuickHashOutput {
    /// Members of digest groups with two or more files, in deterministic order.
    #[must_use]
    pub fn survivors(&self) -> Vec<FileRecord> {
        let mut survivors: Vec<FileRecord> = self
            .groups
            .values()
            .filter(|files| files.len() > 1)
            .flat_map(|files| files.iter().cloned())
            .collect();
        survivors.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        survivors
    }
}

/// Output of the full-hash stage.
#[derive(Debug, Default)]
pub struct FullHashOutput {
    /// Every digest group, including singletons.
    pub groups: HashMap<FullKey, Vec<FileRecord>>,
    /// Whether the stage stopped early on a shutdown request.
    pub interrupted: bool,
}

/// Compute quick digests for all candidates (stage 1).
///
/// Increments `processed_files` once per file whose digest was computed and
/// `error_count` once per file that could not be read; unreadable files are
/// dropped from further consideration.
///
/// # Errors
///
/// Only fatal pool errors are returned (see [`FinderError`]).
pub fn quick_hash_stage(
    candidates: Vec<FileRecord>,
    hasher: &dyn QuickDigest,
    stats: &Stats,
    config: &StageConfig,
) -> Result<QuickHashOutput, FinderError> {
    let total = candidates.len();
    let mut output = QuickHashOutput::default();
    if total == 0 {
        log::debug!("Quick hash: No files to process");
        return Ok(output);
    }

    log::info!("Quick hash: Computing digests for {} files", total);
    if let Some(callback) = config.progress() {
        callback.on_phase_start(QUICK_HASH_PHASE, total);
    }

    let completed = AtomicUsize::new(0);
    let outcome = run_pool(
        candidates,
        config.workers,
        config.shutdown_flag.as_deref(),
        |record: FileRecord| {
            let result = match hasher.quick_digest(&record.path, record.size) {
                Ok(digest) => {
                    stats.inc_processed_files();
                    log::trace!("Quick digest {:016x}: {}", digest, record.path.display());
                    Some(QuickHashResult { record, digest })
                }
                Err(e) => {
                    stats.inc_error_count();
                    log::warn!("Failed to quick-hash {}: {}", record.path.display(), e);
                    None
                }
            };
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(callback) = config.progress() {
                let path = result
                    .as_ref()
                    .map(|r| r.record.path.to_string_lossy().into_owned())
                    .unwrap_or_default();
                callback.on_progress(done, &path);
            }
            result
        },
        |result| {
            let key = QuickKey {
                size: result.record.size,
                digest: result.digest,
            };
            output.groups.entry(key).or_default().push(result.record);
        },
    )?;

    output.interrupted = outcome.interrupted || config.is_shutdown_requested();
    if output.interrupted {
        log::info!(
            "Quick hash: Interrupted by shutdown signal ({} files not processed)",
            outcome.abandoned
        );
    }

    if let Some(callback) = config.progress() {
        callback.on_phase_end(QUICK_HASH_PHASE);
    }

    let survivors: usize = output
        .groups
        .values()
        .filter(|files| files.len() > 1)
        .map(Vec::len)
        .sum();
    log::info!(
        "Quick hash complete: {} files → {} potential duplicates",
        total,
        survivors
    );

    Ok(output)
}

/// Compute full digests for the quick-hash survivors (stage 2).
///
/// Increments `error_count` once per file that could not be read.
///
/// # Errors
///
/// Only fatal pool errors are returned (see [`FinderError`]).
pub fn full_hash_stage(
    survivors: Vec<FileRecord>,
    hasher: &dyn FullDigest,
    stats: &Stats,
    config: &StageConfig,
) -> Result<FullHashOutput, FinderError> {
    let total = survivors.len();
    let mut output = FullHashOutput::default();
    if total == 0 {
        log::debug!("Full hash: No files to process");
        return Ok(output);
    }

    log::info!("Full hash: Computing digests for {} files", total);
    if let Some(callback) = config.progress() {
        callback.on_phase_start(FULL_HASH_PHASE, total);
    }

    let completed = AtomicUsize::new(0);
    let outcome = run_pool(
        survivors,
        config.workers,
        config.shutdown_flag.as_deref(),
        |record: FileRecord| {
            if record.size > LARGE_FILE_THRESHOLD {
                log::debug!(
                    "Hashing large file ({} MB): {}",
                    record.size / (1024 * 1024),
                    record.path.display()
                );
            }
            let result = match hasher.full_digest(&record.path) {
                Ok(digest) => {
                    log::trace!("Full digest {}: {}", hash_to_hex(&digest), record.path.display());
                    if let Some(callback) = config.progress() {
                        callback.on_item_completed(record.size);
                    }
                    Some(FullHashResult { record, digest })
                }
                Err(e) => {
                    stats.inc_error_count();
                    log::warn!("Failed to hash {}: {}", record.path.display(), e);
                    None
                }
            };
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(callback) = config.progress() {
                let path = result
                    .as_ref()
                    .map(|r| r.record.path.to_string_lossy().into_owned())
                    .unwrap_or_default();
                callback.on_progress(done, &path);
            }
            result
        },
        |result| {
            let key = FullKey {
                size: result.record.size,
                digest: result.digest,
            };
            output.groups.entry(key).or_default().push(result.record);
        },
    )?;

    output.interrupted = outcome.interrupted || config.is_shutdown_requested();
    if output.interrupted {
        log::info!(
            "Full hash: Interrupted by shutdown signal ({} files not processed)",
            outcome.abandoned
        );
    }

    if let Some(callback) = config.progress() {
        callback.on_phase_end(FULL_HASH_PHASE);
    }

    let confirmed = output.groups.values().filter(|files| files.len() > 1).count();
    log::info!(
        "Full hash complete: {} files → {} confirmed groups",
        total,
        confirmed
    );

    Ok(output)
}

// ============================================================================
// DuplicateFinder - Pipeline Orchestrator
// ============================================================================

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Settings shared by both hashing stages.
    pub stage: StageConfig,
    /// Quick digest capability.
    pub quick_hasher: Arc<dyn QuickDigest>,
    /// Full digest capability.
    pub full_hasher: Arc<dyn FullDigest>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("stage", &self.stage)
            .field("quick_hasher", &"<quick digest>")
            .field("full_hasher", &"<full digest>")
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            stage: StageConfig::default(),
            quick_hasher: Arc::new(XxQuickHasher::new()),
            full_hasher: Arc::new(Blake3Hasher::new()),
        }
    }
}

impl FinderConfig {
    /// Set the worker count for both stages.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.stage.workers = workers;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stage.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.stage.progress_callback = Some(callback);
        self
    }

    /// Replace the quick digest algorithm.
    #[must_use]
    pub fn with_quick_hasher(mut self, hasher: Arc<dyn QuickDigest>) -> Self {
        self.quick_hasher = hasher;
        self
    }

    /// Replace the full digest algorithm.
    #[must_use]
    pub fn with_full_hasher(mut self, hasher: Arc<dyn FullDigest>) -> Self {
        self.full_hasher = hasher;
        self
    }
}

/// Duplicate finder that orchestrates the multi-stage detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupescout::duplicates::{DuplicateFinder, SizeBuckets, Stats};
///
/// let finder = DuplicateFinder::with_defaults();
/// let stats = Stats::new();
/// let report = finder.find(SizeBuckets::new(), &stats).unwrap();
/// assert!(report.groups.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicates among size-bucketed file records.
    ///
    /// Per-file read failures are counted in `stats.error_count` and never
    /// abort the run. A shutdown request yields `Ok` with an interrupted,
    /// group-less report carrying the statistics gathered so far.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` before any hashing starts if the worker count
    /// is zero or a bucket holds a record of the wrong size, and if the
    /// worker pool cannot be created.
    pub fn find(&self, buckets: SizeBuckets, stats: &Stats) -> Result<DuplicateReport, FinderError> {
        let stage = &self.config.stage;
        if stage.workers == 0 {
            return Err(FinderError::InvalidWorkerCount);
        }
        validate_buckets(&buckets)?;

        if stage.is_shutdown_requested() {
            stats.finish();
            return Ok(DuplicateReport::interrupted(stats));
        }

        let candidates = select_candidates(&buckets);
        drop(buckets);
        if candidates.len() < 2 {
            log::info!("Fewer than two candidates; nothing to hash");
            stats.finish();
            return Ok(DuplicateReport::empty(stats));
        }

        let quick = quick_hash_stage(candidates, self.config.quick_hasher.as_ref(), stats, stage)?;
        if quick.interrupted {
            stats.finish();
            return Ok(DuplicateReport::interrupted(stats));
        }

        let survivors = quick.survivors();
        drop(quick);
        if survivors.is_empty() {
            stats.finish();
            return Ok(DuplicateReport::empty(stats));
        }

        let full = full_hash_stage(survivors, self.config.full_hasher.as_ref(), stats, stage)?;
        if full.interrupted {
            stats.finish();
            return Ok(DuplicateReport::interrupted(stats));
        }

        stats.finish();
        let report = assemble_report(full.groups, stats);
        log::info!(
            "Found {} duplicate groups, {} bytes reclaimable",
            report.groups.len(),
            report.total_wasted_space
        );
        Ok(report)
    }
}
