// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

/// Write `name` under `dir` with a modification time `age_secs` in the past.
fn touch(dir: &Path, name: &str, age_secs: u64) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, name).unwrap();
    let mtime = SystemTime::now() - Duration::from_secs(age_secs);
    fs::File::options().write(true).open(&path).unwrap().set_modified(mtime).unwrap();
    path
}

fn names(scan: ArtifactScan) -> Vec<String> {
    let mut names: Vec<String> = scan
        .map(|c| c.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn any_jar() -> ArtifactPattern {
    ArtifactPattern::from_regex(r".*\.jar").unwrap()
}

#[test]
fn list_walks_subdirectories() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "foo-1.0.jar", 300);
    touch(tmp.path(), "foo-1.1.jar", 200);
    touch(tmp.path(), "nested/foo-1.2.blah.jar", 100);
    touch(tmp.path(), "notes.txt", 100);

    let found = names(list(tmp.path(), &any_jar(), ScanOptions::default()).unwrap());
    assert_eq!(found, vec!["foo-1.0.jar", "foo-1.1.jar", "foo-1.2.blah.jar"]);

    let blah = ArtifactPattern::from_regex(r".*blah\.jar").unwrap();
    assert_eq!(list(tmp.path(), &blah, ScanOptions::default()).unwrap().count(), 1);
}

#[test]
fn list_without_recursion_stays_in_root() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "foo-1.0.jar", 300);
    touch(tmp.path(), "nested/foo-1.2.jar", 100);

    let found = names(list(tmp.path(), &any_jar(), ScanOptions { recursive: false }).unwrap());
    assert_eq!(found, vec!["foo-1.0.jar"]);
}

#[test]
fn list_skips_directories_that_match() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("foo-9.0.jar")).unwrap();
    touch(tmp.path(), "foo-1.0.jar", 100);

    let found = names(list(tmp.path(), &any_jar(), ScanOptions::default()).unwrap());
    assert_eq!(found, vec!["foo-1.0.jar"]);
}

#[test]
fn list_reflects_live_directory_state() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "foo-1.0.jar", 100);
    let pattern = derive_pattern(Path::new("foo-1.0.jar"));

    assert_eq!(list(tmp.path(), &pattern, ScanOptions::default()).unwrap().count(), 1);
    touch(tmp.path(), "foo-1.1.jar", 10);
    assert_eq!(list(tmp.path(), &pattern, ScanOptions::default()).unwrap().count(), 2);
}

#[test]
fn list_missing_directory_is_lookup_error() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("gone");

    let err = list(&missing, &any_jar(), ScanOptions::default()).err().unwrap();
    assert!(matches!(err, LocateError::Lookup { ref dir, .. } if dir == &missing));
}

#[test]
fn find_newest_picks_latest_mtime() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "foo-1.0.jar", 300);
    let newest = touch(tmp.path(), "foo-1.2.blah.jar", 10);
    touch(tmp.path(), "foo-1.1.jar", 200);
    touch(tmp.path(), "bar-9.9.jar", 1);

    let pattern = derive_pattern(Path::new("foo-1.0.jar"));
    assert_eq!(find_newest(tmp.path(), &pattern, ScanOptions::default()).unwrap(), newest);
}

#[test]
fn find_newest_breaks_ties_by_path() {
    let tmp = TempDir::new().unwrap();
    let a = touch(tmp.path(), "app-1.0.jar", 0);
    let b = touch(tmp.path(), "app-2.0.jar", 0);
    let mtime = fs::metadata(&a).unwrap().modified().unwrap();
    fs::File::options().write(true).open(&b).unwrap().set_modified(mtime).unwrap();

    let pattern = derive_pattern(&a);
    for _ in 0..3 {
        assert_eq!(find_newest(tmp.path(), &pattern, ScanOptions::default()).unwrap(), a);
    }
}

#[test]
fn find_newest_without_match_is_not_found() {
    let tmp = TempDir::new().unwrap();
    touch(tmp.path(), "other-1.0.jar", 10);

    let pattern = derive_pattern(Path::new("app-1.0.jar"));
    let err = find_newest(tmp.path(), &pattern, ScanOptions::default()).unwrap_err();
    match err {
        LocateError::NotFound { dir, pattern } => {
            assert_eq!(dir, tmp.path());
            assert!(pattern.contains("jar"));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn newest_version_scans_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let current = touch(tmp.path(), "app-1.0.jar", 300);
    let newest = touch(tmp.path(), "app-1.2.jar", 10);

    assert_eq!(newest_version(&current, ScanOptions::default()).unwrap(), newest);
}

#[test]
fn fs_locator_resolves_through_trait() {
    let tmp = TempDir::new().unwrap();
    let current = touch(tmp.path(), "svc-0.9-SNAPSHOT.jar", 300);
    let newest = touch(tmp.path(), "svc-1.0.jar", 10);

    let lookup: &dyn ArtifactLookup = &FsLocator::default();
    assert_eq!(lookup.newest_version(&current).unwrap(), newest);
}

#[test]
fn fs_locator_reports_missing_parent() {
    let tmp = TempDir::new().unwrap();
    let current = tmp.path().join("gone").join("svc-1.0.jar");

    let err = FsLocator::default().newest_version(&current).unwrap_err();
    assert!(matches!(err, LocateError::Lookup { .. }));
}
