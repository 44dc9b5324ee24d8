use dupescout::duplicates::{
    group_by_size, quick_hash_stage, DuplicateFinder, FinderConfig, StageConfig, Stats,
};
use dupescout::scanner::{
    Blake3Hasher, FileRecord, FullDigest, FullHash, HashError, QuickDigest, XxQuickHasher,
};
use dupescout::signal::ShutdownHandler;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn many_duplicates(count: usize) -> (TempDir, Vec<FileRecord>) {
    let dir = tempdir().unwrap();
    let records = (0..count)
        .map(|i| {
            let path = dir.path().join(format!("f{i:04}.txt"));
            fs::write(&path, b"same content everywhere").unwrap();
            FileRecord::new(path, 23)
        })
        .collect();
    (dir, records)
}

/// Raises the shutdown flag after a number of digests.
struct TrippingQuick {
    inner: XxQuickHasher,
    seen: AtomicUsize,
    trip_after: usize,
    handler: ShutdownHandler,
}

impl QuickDigest for TrippingQuick {
    fn quick_digest(&self, path: &Path, size: u64) -> Result<u64, HashError> {
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.trip_after {
            self.handler.request_shutdown();
        }
        self.inner.quick_digest(path, size)
    }
}

/// Full-digest variant of [`TrippingQuick`].
struct TrippingFull {
    inner: Blake3Hasher,
    seen: AtomicUsize,
    trip_after: usize,
    handler: ShutdownHandler,
}

impl FullDigest for TrippingFull {
    fn full_digest(&self, path: &Path) -> Result<FullHash, HashError> {
        if self.seen.fetch_add(1, Ordering::SeqCst) + 1 == self.trip_after {
            self.handler.request_shutdown();
        }
        self.inner.full_digest(path)
    }
}

#[test]
fn test_cancel_before_start() {
    let (_dir, records) = many_duplicates(10);
    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let stats = Stats::new();
    let report = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(handler.get_flag()))
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.interrupted);
    assert!(report.groups.is_empty());
    assert_eq!(stats.processed_files(), 0);
}

#[test]
fn test_cancel_mid_quick_stage_stops_pulling() {
    let (_dir, records) = many_duplicates(500);
    let handler = ShutdownHandler::new();
    let hasher = Arc::new(TrippingQuick {
        inner: XxQuickHasher::new(),
        seen: AtomicUsize::new(0),
        trip_after: 5,
        handler: handler.clone(),
    });

    let stats = Stats::new();
    let config = FinderConfig::default()
        .with_workers(2)
        .with_shutdown_flag(handler.get_flag())
        .with_quick_hasher(hasher.clone());
    let report = DuplicateFinder::new(config)
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.interrupted);
    assert!(report.groups.is_empty());
    // Each worker finishes at most the file it was holding
    assert!(hasher.seen.load(Ordering::SeqCst) < 500);
    assert!(stats.processed_files() < 500);
    assert_eq!(report.stats.processed_files, stats.processed_files());
}

#[test]
fn test_cancel_mid_full_stage_discards_groups() {
    let (_dir, records) = many_duplicates(300);
    let handler = ShutdownHandler::new();
    let hasher = Arc::new(TrippingFull {
        inner: Blake3Hasher::new(),
        seen: AtomicUsize::new(0),
        trip_after: 3,
        handler: handler.clone(),
    });

    let stats = Stats::new();
    let config = FinderConfig::default()
        .with_workers(2)
        .with_shutdown_flag(handler.get_flag())
        .with_full_hasher(hasher.clone());
    let report = DuplicateFinder::new(config)
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.interrupted);
    assert!(report.groups.is_empty());
    assert_eq!(report.total_wasted_space, 0);
    // The quick stage completed for every candidate before the trip
    assert_eq!(stats.processed_files(), 300);
    assert_eq!(report.stats.processed_files, 300);
    assert!(hasher.seen.load(Ordering::SeqCst) < 300);
    assert_eq!(stats.error_count(), 0);
}

#[test]
fn test_stage_reports_interruption() {
    let (_dir, records) = many_duplicates(50);
    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let stats = Stats::new();
    let config = StageConfig::default()
        .with_workers(3)
        .with_shutdown_flag(handler.get_flag());
    let output = quick_hash_stage(records, &XxQuickHasher::new(), &stats, &config).unwrap();

    assert!(output.interrupted);
    assert!(output.groups.is_empty());
}

#[test]
fn test_uncancelled_run_not_interrupted() {
    let (_dir, records) = many_duplicates(20);
    let handler = ShutdownHandler::new();

    let report = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(handler.get_flag()))
        .find(group_by_size(records), &Stats::new())
        .unwrap();

    assert!(!report.interrupted);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].count, 20);
}
