//! Build output discovery
//!
//! Scans a build directory for files that classify as runnable. Object files
//! and libraries carry the same ELF magic as executables and are skipped by
//! extension.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::artifact::{classify, Kind};
use crate::error::{Result, RunError};

/// Extensions of ELF files that are never launched directly
const SKIPPED_EXTENSIONS: &[&str] = &["o", "obj", "a", "so"];

/// Build-system bookkeeping directories
const SKIPPED_DIRS: &[&str] = &["CMakeFiles"];

/// A runnable file found under the build directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// Path to the file
    pub path: PathBuf,

    /// Classified kind
    pub kind: Kind,

    /// Size in bytes
    pub size: u64,
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || SKIPPED_DIRS.contains(&&*name)
}

fn has_skipped_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SKIPPED_EXTENSIONS.contains(&e))
}

/// Collect runnable files under `root`, sorted by path
pub fn find_candidates(root: &Path, max_depth: usize) -> Result<Vec<Candidate>> {
    if !root.is_dir() {
        return Err(RunError::NotAccessible {
            path: root.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        });
    }
    debug!(root = %root.display(), max_depth, "scanning for runnable outputs");

    let mut candidates = Vec::new();
    let walker = WalkDir::new(root)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped_dir(e));

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() || has_skipped_extension(entry.path()) {
            continue;
        }
        let kind = match classify(entry.path()) {
            Ok(kind) => kind,
            Err(e) => {
                trace!(path = %entry.path().display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        if !kind.is_runnable() {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        candidates.push(Candidate {
            path: entry.into_path(),
            kind,
            size,
        });
    }

    candidates.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(count = candidates.len(), "scan finished");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, bytes: &[u8]) -> PathBuf {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_finds_executables_and_archives() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let app = write(root, "bin/app", b"\x7fELF\x02");
        let jar = write(root, "libs/tool.jar", b"PK\x03\x04");
        write(root, "bin/app.o", b"\x7fELF\x01");
        write(root, "lib/libfoo.so", b"\x7fELF\x01");
        write(root, "CMakeFiles/probe/a.out", b"\x7fELF\x01");
        write(root, ".cache/blob", b"\x7fELF\x01");
        write(root, "README.txt", b"hello");

        let found = find_candidates(root, 4).unwrap();
        let paths: Vec<_> = found.iter().map(|c| c.path.clone()).collect();
        assert_eq!(paths, vec![app, jar]);
        assert_eq!(found[0].kind, Kind::NativeExecutable);
        assert_eq!(found[1].kind, Kind::ManagedArchive);
        assert_eq!(found[0].size, 5);
    }

    #[test]
    fn test_respects_max_depth() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let shallow = write(root, "app", b"\x7fELF");
        write(root, "a/b/c/deep", b"\x7fELF");

        let found = find_candidates(root, 1).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, shallow);
    }

    #[test]
    fn test_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = find_candidates(&temp.path().join("build"), 4).unwrap_err();
        assert!(matches!(err, RunError::NotAccessible { .. }));
    }
}
