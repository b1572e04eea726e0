//! Error types for vedtag.
//!
//! Everything here is scoped to ONE file: the batch driver records the
//! error for that file and moves on.

use std::path::PathBuf;

use thiserror::Error;

use super::types::FieldId;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Which business rule a candidate record broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    InvalidDiscNumber,
    InvalidOrMissingTrack,
    InvalidDateFormat,
    FutureDate,
    DateTooOld,
    InvalidVersion,
    VersionDateWindowViolation,
    ForbiddenCoverArtistPairing,
    InvalidSpecialFlag,
}

/// A record failed the write-path gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub field: FieldId,
    pub reason: String,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, field: FieldId, reason: impl Into<String>) -> Self {
        ValidationError {
            kind,
            field,
            reason: reason.into(),
        }
    }
}

/// Encode/decode failures of the embedded payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// A required field was empty at encode time.
    #[error("missing required field {field}")]
    MissingField { field: FieldId },

    /// The embedded text is not the expected key/value object.
    #[error("malformed payload: {reason}")]
    Malformed { reason: String },
}

/// Rename step failures.
#[derive(Error, Debug)]
pub enum RenameError {
    /// Another file already owns the computed name.
    #[error("target already exists: {}", target_path.display())]
    Collision { target_path: PathBuf },

    /// Sanitized stem is not usable as a file name.
    #[error("sanitized filename is empty or reserved: {stem:?}")]
    EmptyName { stem: String },

    #[error("rename failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error across the library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Rename(#[from] RenameError),

    /// ID3 read/write failure (wraps id3::Error)
    #[error("tag error: {0}")]
    Tag(#[from] id3::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A per-track field file could not be turned into a record.
    #[error("bad sidecar: {reason}")]
    Sidecar { reason: String },

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),
}
