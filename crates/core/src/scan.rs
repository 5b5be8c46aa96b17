// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact discovery: list matching files and pick the newest.

use crate::pattern::{derive_pattern, ArtifactPattern};
use serde::Deserialize;
use std::fs::ReadDir;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Errors from artifact discovery
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("cannot read artifact directory {}: {source}", dir.display())]
    Lookup {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no artifact matching {pattern} under {}", dir.display())]
    NotFound { dir: PathBuf, pattern: String },
}

/// Directory walk options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Descend into subdirectories of the search root.
    pub recursive: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self { recursive: true }
    }
}

/// A matching file found during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactCandidate {
    pub path: PathBuf,
    pub modified: SystemTime,
}

/// Lazy walk over the files under a search root that match a pattern.
///
/// Produced by [`list`]. Each call to [`list`] re-reads the directory tree.
pub struct ArtifactScan {
    pattern: ArtifactPattern,
    options: ScanOptions,
    current: Option<ReadDir>,
    pending: Vec<PathBuf>,
}

/// List files under `dir` whose filename matches `pattern`.
///
/// The root is opened eagerly so a missing or unreadable directory fails here.
/// Unreadable subdirectories and entries are skipped with a warning.
pub fn list(
    dir: &Path,
    pattern: &ArtifactPattern,
    options: ScanOptions,
) -> Result<ArtifactScan, LocateError> {
    let root = std::fs::read_dir(dir)
        .map_err(|source| LocateError::Lookup { dir: dir.to_path_buf(), source })?;
    Ok(ArtifactScan {
        pattern: pattern.clone(),
        options,
        current: Some(root),
        pending: Vec::new(),
    })
}

impl Iterator for ArtifactScan {
    type Item = ArtifactCandidate;

    fn next(&mut self) -> Option<ArtifactCandidate> {
        loop {
            let Some(entries) = self.current.as_mut() else {
                let dir = self.pending.pop()?;
                match std::fs::read_dir(&dir) {
                    Ok(entries) => self.current = Some(entries),
                    Err(e) => {
                        tracing::warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                    }
                }
                continue;
            };

            let entry = match entries.next() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
                None => {
                    self.current = None;
                    continue;
                }
            };

            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                if self.options.recursive {
                    self.pending.push(path);
                }
                continue;
            }
            if !self.pattern.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }

            // Follows symlinks so a linked artifact reports its target's mtime
            match std::fs::metadata(&path).and_then(|meta| {
                if meta.is_file() {
                    meta.modified().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(modified)) => return Some(ArtifactCandidate { path, modified }),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping artifact with unreadable mtime");
                }
            }
        }
    }
}

/// Find the most recently modified file under `dir` matching `pattern`.
///
/// Ties on modification time go to the lexicographically smallest path, so
/// the answer does not depend on directory iteration order.
pub fn find_newest(
    dir: &Path,
    pattern: &ArtifactPattern,
    options: ScanOptions,
) -> Result<PathBuf, LocateError> {
    list(dir, pattern, options)?
        .max_by(|a, b| a.modified.cmp(&b.modified).then_with(|| b.path.cmp(&a.path)))
        .map(|candidate| candidate.path)
        .ok_or_else(|| LocateError::NotFound {
            dir: dir.to_path_buf(),
            pattern: pattern.to_string(),
        })
}

/// Newest sibling version of the artifact at `path`.
///
/// Scans the parent directory with a rule derived from `path`'s filename. A
/// bare filename is resolved against the working directory and the result is
/// returned relative to it.
pub fn newest_version(path: &Path, options: ScanOptions) -> Result<PathBuf, LocateError> {
    let pattern = derive_pattern(path);
    match path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        Some(dir) => find_newest(dir, &pattern, options),
        None => {
            let cwd = Path::new(".");
            let newest = find_newest(cwd, &pattern, options)?;
            Ok(newest.strip_prefix(cwd).map(Path::to_path_buf).unwrap_or(newest))
        }
    }
}

/// Resolves the newest version of an artifact.
pub trait ArtifactLookup {
    fn newest_version(&self, artifact: &Path) -> Result<PathBuf, LocateError>;
}

/// Filesystem-backed lookup
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLocator {
    pub options: ScanOptions,
}

impl FsLocator {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }
}

impl ArtifactLookup for FsLocator {
    fn newest_version(&self, artifact: &Path) -> Result<PathBuf, LocateError> {
        newest_version(artifact, self.options)
    }
}

#[cfg(test)]
#[path = "scan_tests.rs"]
mod tests;
