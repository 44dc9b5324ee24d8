use dupescout::duplicates::{DuplicateFinder, Stats};
use dupescout::scanner::{Walker, WalkerConfig};
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;

#[test]
fn test_duplicates_across_roots() {
    let left = tempdir().unwrap();
    let right = tempdir().unwrap();
    fs::write(left.path().join("photo.jpg"), b"jpeg bytes").unwrap();
    fs::write(right.path().join("copy.jpg"), b"jpeg bytes").unwrap();

    let stats = Arc::new(Stats::new());
    let buckets = Walker::new(
        vec![left.path().to_path_buf(), right.path().to_path_buf()],
        WalkerConfig::default(),
    )
    .collect_buckets(&stats)
    .unwrap();
    let report = DuplicateFinder::with_defaults()
        .find(buckets, &stats)
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].count, 2);
}

#[test]
fn test_overlapping_roots_do_not_self_match() {
    let dir = tempdir().unwrap();
    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("file.bin"), b"only one copy").unwrap();

    let stats = Arc::new(Stats::new());
    let buckets = Walker::new(
        vec![dir.path().to_path_buf(), nested.clone()],
        WalkerConfig::default(),
    )
    .collect_buckets(&stats)
    .unwrap();
    let report = DuplicateFinder::with_defaults()
        .find(buckets, &stats)
        .unwrap();

    assert_eq!(stats.total_files(), 1);
    assert!(report.groups.is_empty());
}

#[test]
fn test_ignored_directory_excluded_from_groups() {
    let dir = tempdir().unwrap();
    let build = dir.path().join("build");
    fs::create_dir(&build).unwrap();
    fs::write(dir.path().join("main.o"), b"object code").unwrap();
    fs::write(build.join("main.o"), b"object code").unwrap();

    let stats = Arc::new(Stats::new());
    let config = WalkerConfig::default().with_ignore_patterns(vec!["build/".to_string()]);
    let buckets = Walker::new(vec![dir.path().to_path_buf()], config)
        .collect_buckets(&stats)
        .unwrap();
    let report = DuplicateFinder::with_defaults()
        .find(buckets, &stats)
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(stats.skipped_dirs(), 1);
}
