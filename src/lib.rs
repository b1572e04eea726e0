//! vedtag
//!
//! Provenance payloads for cover-song MP3s.
//!
//! Each track carries a small record (date, title, artist, cover artist,
//! version, disc/track, comment, special flag, content hash) embedded as
//! JSON in a `COMM` frame with language `ved`. From that record we derive
//! the human-facing tags (title, artist credit, album, track) and a
//! filesystem-safe filename.
//!
//! See [`core`] for the pieces and [`core::pipeline::Pipeline`] for how
//! they fit together.

pub mod core;

pub use crate::core::{Config, Error, Pipeline, Record, Result};
