//! Run statistics shared by the traversal layer and both hashing stages.
//!
//! Every counter is an [`AtomicU64`] updated with `fetch_add`, so a single
//! `Arc<Stats>` can be handed to any number of worker threads. Nothing here
//! is global: each run owns its own instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thread-safe counters describing a run's progress and outcome.
#[derive(Debug)]
pub struct Stats {
    total_files: AtomicU64,
    processed_files: AtomicU64,
    skipped_dirs: AtomicU64,
    skipped_files: AtomicU64,
    error_count: AtomicU64,
    duplicate_groups: AtomicU64,
    duplicate_files: AtomicU64,
    duration_nanos: AtomicU64,
    start_time: DateTime<Utc>,
    started: Instant,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    /// Create zeroed counters, stamping the start time now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            total_files: AtomicU64::new(0),
            processed_files: AtomicU64::new(0),
            skipped_dirs: AtomicU64::new(0),
            skipped_files: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            duplicate_groups: AtomicU64::new(0),
            duplicate_files: AtomicU64::new(0),
            duration_nanos: AtomicU64::new(0),
            start_time: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Count a file accepted by the walker.
    pub fn inc_total_files(&self) {
        self.total_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a successful quick digest.
    pub fn inc_processed_files(&self) {
        self.processed_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a directory pruned from the walk.
    pub fn inc_skipped_dirs(&self) {
        self.skipped_dirs.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a file rejected by a filter.
    pub fn inc_skipped_files(&self) {
        self.skipped_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a file that could not be read or hashed.
    pub fn inc_error_count(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a confirmed duplicate group.
    pub fn inc_duplicate_groups(&self) {
        self.duplicate_groups.fetch_add(1, Ordering::Relaxed);
    }

    /// Add `n` files to the duplicate file count.
    pub fn add_duplicate_files(&self, n: u64) {
        self.duplicate_files.fetch_add(n, Ordering::Relaxed);
    }

    /// Record the elapsed time since construction as the run duration.
    pub fn finish(&self) {
        let nanos = u64::try_from(self.started.elapsed().as_nanos()).unwrap_or(u64::MAX);
        self.duration_nanos.store(nanos, Ordering::Relaxed);
    }

    #[must_use]
    pub fn total_files(&self) -> u64 {
        self.total_files.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn processed_files(&self) -> u64 {
        self.processed_files.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn skipped_dirs(&self) -> u64 {
        self.skipped_dirs.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn skipped_files(&self) -> u64 {
        self.skipped_files.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn duplicate_groups(&self) -> u64 {
        self.duplicate_groups.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn duplicate_files(&self) -> u64 {
        self.duplicate_files.load(Ordering::Relaxed)
    }

    /// When the run started (wall clock).
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Duration recorded by the last [`Stats::finish`] call.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_nanos.load(Ordering::Relaxed))
    }

    /// Copy the current counter values into a plain, serializable struct.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_files: self.total_files(),
            processed_files: self.processed_files(),
            skipped_dirs: self.skipped_dirs(),
            skipped_files: self.skipped_files(),
            error_count: self.error_count(),
            duplicate_groups: self.duplicate_groups(),
            duplicate_files: self.duplicate_files(),
            start_time: self.start_time,
            duration_ms: u64::try_from(self.duration().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Point-in-time copy of [`Stats`], carried by the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_files: u64,
    pub processed_files: u64,
    pub skipped_dirs: u64,
    pub skipped_files: u64,
    pub error_count: u64,
    pub duplicate_groups: u64,
    pub duplicate_files: u64,
    pub start_time: DateTime<Utc>,
    pub duration_ms: u64,
}
