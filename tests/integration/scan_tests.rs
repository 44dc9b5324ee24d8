use dupescout::duplicates::{group_by_size, DuplicateFinder, FinderConfig, Stats};
use dupescout::scanner::{FileRecord, Walker, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

const SHARED: &[u8] = b"This is test content for duplicate files";
const DIFFERENT: &[u8] = b"This is different content";
const UNIQUE: &[u8] = b"Unique content";

fn write(dir: &Path, name: &str, content: &[u8]) -> FileRecord {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    FileRecord::new(path, content.len() as u64)
}

fn scan(dir: &Path) -> (dupescout::duplicates::DuplicateReport, Arc<Stats>) {
    let stats = Arc::new(Stats::new());
    let buckets = Walker::new(vec![dir.to_path_buf()], WalkerConfig::default())
        .collect_buckets(&stats)
        .unwrap();
    let report = DuplicateFinder::new(FinderConfig::default().with_workers(4))
        .find(buckets, &stats)
        .unwrap();
    (report, stats)
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let (report, stats) = scan(dir.path());

    assert!(report.groups.is_empty());
    assert_eq!(stats.total_files(), 0);
    assert_eq!(stats.processed_files(), 0);
}

#[test]
fn test_three_two_one_scenario() {
    let dir = tempdir().unwrap();
    let records = vec![
        write(dir.path(), "a1.txt", SHARED),
        write(dir.path(), "a2.txt", SHARED),
        write(dir.path(), "a3.txt", SHARED),
        write(dir.path(), "b1.txt", DIFFERENT),
        write(dir.path(), "b2.txt", DIFFERENT),
        write(dir.path(), "unique.txt", UNIQUE),
    ];

    let stats = Stats::new();
    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &stats)
        .unwrap();

    assert_eq!(report.groups.len(), 2);

    let first = &report.groups[0];
    assert_eq!(first.id, 1);
    assert_eq!(first.count, 3);
    assert_eq!(first.size, SHARED.len() as u64);
    assert_eq!(first.wasted_space, 2 * SHARED.len() as u64);

    let second = &report.groups[1];
    assert_eq!(second.id, 2);
    assert_eq!(second.count, 2);
    assert_eq!(second.size, DIFFERENT.len() as u64);

    // The unique file sits alone in its size bucket and is never hashed
    assert_eq!(stats.processed_files(), 5);
    assert_eq!(stats.duplicate_groups(), 2);
    assert_eq!(stats.duplicate_files(), 5);
    assert_eq!(stats.error_count(), 0);
    assert_eq!(
        report.total_wasted_space,
        2 * SHARED.len() as u64 + DIFFERENT.len() as u64
    );
    assert!(report
        .groups
        .iter()
        .all(|g| g.files.iter().all(|f| !f.ends_with("unique.txt"))));
}

#[test]
fn test_three_two_one_scenario_through_walker() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a1.txt", SHARED);
    write(dir.path(), "a2.txt", SHARED);
    write(dir.path(), "a3.txt", SHARED);
    write(dir.path(), "b1.txt", DIFFERENT);
    write(dir.path(), "b2.txt", DIFFERENT);
    write(dir.path(), "unique.txt", UNIQUE);

    let (report, stats) = scan(dir.path());

    assert_eq!(stats.total_files(), 6);
    assert_eq!(stats.processed_files(), 5);
    assert_eq!(report.groups.len(), 2);
    assert_eq!(report.stats.duplicate_files, 5);
}

#[test]
fn test_no_candidates_means_no_hashing() {
    let dir = tempdir().unwrap();
    let records = vec![
        write(dir.path(), "a", b"1"),
        write(dir.path(), "b", b"22"),
        write(dir.path(), "c", b"333"),
    ];

    let stats = Stats::new();
    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(report.total_wasted_space, 0);
    assert_eq!(stats.processed_files(), 0);
    assert_eq!(stats.duplicate_groups(), 0);
    assert_eq!(stats.duplicate_files(), 0);
}

#[test]
fn test_single_file_input() {
    let dir = tempdir().unwrap();
    let records = vec![write(dir.path(), "only", b"alone")];

    let stats = Stats::new();
    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(stats.processed_files(), 0);
}

#[test]
fn test_same_size_different_content() {
    let dir = tempdir().unwrap();
    let records = vec![
        write(dir.path(), "a", b"aaaa"),
        write(dir.path(), "b", b"bbbb"),
        write(dir.path(), "c", b"cccc"),
    ];

    let stats = Stats::new();
    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(stats.processed_files(), 3);
}

#[test]
fn test_head_tail_match_is_rejected_by_full_hash() {
    let dir = tempdir().unwrap();
    let mut left = vec![0xAAu8; 40 * 1024];
    let mut right = left.clone();
    left[20 * 1024] = 1;
    right[20 * 1024] = 2;

    let records = vec![
        write(dir.path(), "left.bin", &left),
        write(dir.path(), "right.bin", &right),
    ];

    let stats = Stats::new();
    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &stats)
        .unwrap();

    assert!(report.groups.is_empty());
    assert_eq!(stats.processed_files(), 2);
}

#[test]
fn test_large_identical_files_grouped() {
    let dir = tempdir().unwrap();
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let records = vec![
        write(dir.path(), "x.bin", &content),
        write(dir.path(), "y.bin", &content),
    ];

    let report = DuplicateFinder::with_defaults()
        .find(group_by_size(records), &Stats::new())
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size, 200_000);
    assert_eq!(report.groups[0].hash.len(), 64);
}

#[test]
fn test_zero_byte_files_grouped_when_included() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");
    write(dir.path(), "data", b"data");

    let stats = Arc::new(Stats::new());
    let config = WalkerConfig {
        include_empty: true,
        ..Default::default()
    };
    let buckets = Walker::new(vec![dir.path().to_path_buf()], config)
        .collect_buckets(&stats)
        .unwrap();
    let report = DuplicateFinder::with_defaults()
        .find(buckets, &stats)
        .unwrap();

    assert_eq!(report.groups.len(), 1);
    assert_eq!(report.groups[0].size, 0);
    assert_eq!(report.groups[0].wasted_space, 0);
    assert_eq!(stats.processed_files(), 2);
}

#[test]
fn test_report_order_is_deterministic() {
    let dir = tempdir().unwrap();
    for name in ["d", "c", "b", "a"] {
        write(dir.path(), &format!("{name}1"), name.repeat(10).as_bytes());
        write(dir.path(), &format!("{name}2"), name.repeat(10).as_bytes());
    }

    let first = scan(dir.path()).0;
    let second = scan(dir.path()).0;

    let paths = |r: &dupescout::duplicates::DuplicateReport| -> Vec<Vec<PathBuf>> {
        r.groups.iter().map(|g| g.files.clone()).collect()
    };
    assert_eq!(paths(&first), paths(&second));

    // Equal waste everywhere, so groups follow their first path
    let firsts: Vec<_> = first.groups.iter().map(|g| g.files[0].clone()).collect();
    let mut sorted = firsts.clone();
    sorted.sort();
    assert_eq!(firsts, sorted);
    assert_eq!(
        first.groups.iter().map(|g| g.id).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
}

#[test]
fn test_independent_runs_do_not_share_stats() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a", b"same");
    write(dir.path(), "b", b"same");

    let (_, first) = scan(dir.path());
    let (_, second) = scan(dir.path());

    assert_eq!(first.processed_files(), 2);
    assert_eq!(second.processed_files(), 2);
}

#[cfg(unix)]
#[test]
fn test_non_utf8_duplicate_renders_as_json() {
    use dupescout::output::{write_report, OutputFormat};
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join(OsStr::from_bytes(b"caf\xe9.txt")), SHARED).unwrap();
    write(dir.path(), "cafe.txt", SHARED);

    let (report, _stats) = scan(dir.path());
    assert_eq!(report.groups.len(), 1);

    let mut buf = Vec::new();
    write_report(&report, OutputFormat::Json, &mut buf).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    let files = value["groups"][0]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files
        .iter()
        .any(|f| f.as_str().is_some_and(|s| s.ends_with("caf\u{FFFD}.txt"))));
}
