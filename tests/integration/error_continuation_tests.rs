use dupescout::duplicates::{group_by_size, DuplicateFinder, FinderConfig, FinderError, SizeBuckets, Stats};
use dupescout::scanner::{FileRecord, Walker, WalkerConfig};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_file_deleted_after_discovery() {
    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.path().join(name), b"identical bytes").unwrap();
    }
    fs::write(dir.path().join("x.txt"), b"other  content!").unwrap();

    let stats = Arc::new(Stats::new());
    let buckets = Walker::new(vec![dir.path().to_path_buf()], WalkerConfig::default())
        .collect_buckets(&stats)
        .unwrap();

    let victim = dir.path().canonicalize().unwrap().join("b.txt");
    fs::remove_file(&victim).unwrap();

    let report = DuplicateFinder::with_defaults()
        .find(buckets, &stats)
        .unwrap();

    assert!(stats.error_count() >= 1);
    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].count, 2);
    assert!(report
        .groups
        .iter()
        .all(|g| !g.files.contains(&victim)));
}

#[test]
fn test_all_candidates_missing() {
    let records = vec![
        FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100),
        FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100),
    ];

    let stats = Stats::new();
    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(stats.error_count(), 2);
    assert_eq!(stats.processed_files(), 0);
    assert!(!report.interrupted);
}

#[test]
fn test_zero_workers_is_fatal() {
    let result = DuplicateFinder::new(FinderConfig::default().with_workers(0))
        .find(SizeBuckets::new(), &Stats::new());
    assert!(matches!(result, Err(FinderError::InvalidWorkerCount)));
}

#[test]
fn test_mismatched_bucket_is_fatal() {
    let mut buckets = SizeBuckets::new();
    buckets.insert(
        10,
        vec![FileRecord::new("/a", 10), FileRecord::new("/b", 12)],
    );

    let stats = Stats::new();
    let result = DuplicateFinder::with_defaults().find(buckets, &stats);

    assert!(matches!(
        result,
        Err(FinderError::BucketSizeMismatch { size: 10, actual: 12, .. })
    ));
    assert_eq!(stats.processed_files(), 0);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_counted() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked.txt");
    fs::write(dir.path().join("open.txt"), b"payload").unwrap();
    fs::write(&locked, b"payload").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to test there
    if fs::read(&locked).is_ok() {
        return;
    }

    let records = vec![
        FileRecord::new(dir.path().join("open.txt"), 7),
        FileRecord::new(locked.clone(), 7),
    ];
    let stats = Stats::new();
    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(stats.error_count(), 1);
    assert_eq!(stats.processed_files(), 1);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}
