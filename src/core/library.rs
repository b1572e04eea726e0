//! core/library.rs
//! Discover `.mp3` files under one or more roots.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::Result;
use super::rename::AUDIO_EXTENSION;

/// Discover candidate audio files under multiple roots.
///
/// - A root may be a single file or a directory (walked recursively)
/// - De-dupes across overlapping roots by full path
/// - Sorts paths once, so batch output is stable
pub fn scan_paths(roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut seen: HashSet<PathBuf> = HashSet::with_capacity(1024);
    let mut out: Vec<PathBuf> = Vec::new();

    for root in roots {
        let paths = if root.is_file() {
            vec![root.clone()]
        } else {
            scan_mp3s(root)?
        };
        for path in paths {
            if seen.insert(path.clone()) {
                out.push(path);
            }
        }
    }

    out.sort();
    Ok(out)
}

/// Every `.mp3` below `root`, unordered.
pub fn scan_mp3s(root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", dir.display())))?;

        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_mp3(&path) {
                found.push(path);
            }
        }
    }

    Ok(found)
}

/// Extension check only, case-insensitive.
pub fn is_mp3(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(AUDIO_EXTENSION))
}
