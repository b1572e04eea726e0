//! core/rename.rs
//!
//! Move a file to its rendered name, next to where it already is.
//!
//! Never overwrites: if the target exists the file is left alone and the
//! caller gets `RenameError::Collision` to report and skip.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::error::RenameError;

/// Extension appended after sanitization.
pub const AUDIO_EXTENSION: &str = "mp3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    /// Already carries the rendered name.
    Unchanged,
    Renamed { from: PathBuf, to: PathBuf },
    /// Dry run: would have been renamed.
    Planned { from: PathBuf, to: PathBuf },
}

/// Where `path` should live given a sanitized `stem`.
pub fn target_path(path: &Path, stem: &str) -> Result<PathBuf, RenameError> {
    if stem.trim().is_empty() || stem == "." || stem == ".." {
        return Err(RenameError::EmptyName {
            stem: stem.to_string(),
        });
    }
    Ok(path.with_file_name(format!("{stem}.{AUDIO_EXTENSION}")))
}

/// The free target a rename would use, or `None` if `path` already has it.
/// Touches nothing, so callers can check before writing any frame.
pub fn check_target(path: &Path, stem: &str) -> Result<Option<PathBuf>, RenameError> {
    let target = target_path(path, stem)?;

    if path.file_name() == target.file_name() {
        return Ok(None);
    }
    if target.exists() {
        return Err(RenameError::Collision {
            target_path: target,
        });
    }
    Ok(Some(target))
}

/// Rename `path` to `<stem>.mp3` in the same directory.
///
/// - same name -> `Unchanged`
/// - target exists -> `Collision`, nothing touched
/// - `dry_run` -> `Planned`, nothing touched
pub fn rename_to_stem(path: &Path, stem: &str, dry_run: bool) -> Result<RenameOutcome, RenameError> {
    let Some(target) = check_target(path, stem)? else {
        return Ok(RenameOutcome::Unchanged);
    };

    if dry_run {
        return Ok(RenameOutcome::Planned {
            from: path.to_path_buf(),
            to: target,
        });
    }

    fs::rename(path, &target)?;
    info!(from = %path.display(), to = %target.display(), "renamed");

    Ok(RenameOutcome::Renamed {
        from: path.to_path_buf(),
        to: target,
    })
}
