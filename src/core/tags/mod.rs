//! core/tags/mod.rs
//!
//! Tag store adapter: the only place that touches ID3 frames.
//! Public API:
//! - [`TagStore`] is what the pipelines talk to
//! - [`Id3Store`] implements it on real MP3 files via the `id3` crate
//!
//! The embedded payload lives in a `COMM` frame with language `ved`, next to
//! (never instead of) the human-readable `eng` comments.

mod art;
mod read;
mod util;
mod write;

use std::path::Path;

use id3::Version;

use super::error::Result;
use super::types::{Artwork, Presentation};

pub use art::read_embedded_art;

/// Comment language marking the embedded payload.
pub const PAYLOAD_LANG: &str = "ved";
/// Language of the human-readable comments.
pub const DISPLAY_LANG: &str = "eng";
/// Description of the comment mirrored for ID3v1-only players.
pub const LEGACY_COMMENT_DESC: &str = "ID3v1 Comment";

/// Get/set the embedded payload and the presentation frames of one file.
pub trait TagStore {
    /// `Ok(None)` when the file has no tag or no payload.
    fn read_payload(&self, path: &Path) -> Result<Option<String>>;

    /// Replace the embedded payload, keeping every other frame.
    fn write_payload(&self, path: &Path, payload: &str) -> Result<()>;

    /// Overwrite the standard display frames. Artwork is optional and only
    /// JPEG/PNG are embedded.
    fn write_presentation(
        &self,
        path: &Path,
        presentation: &Presentation,
        artwork: Option<&Artwork>,
    ) -> Result<()>;
}

/// [`TagStore`] backed by ID3v2 tags on disk.
#[derive(Debug, Clone, Copy)]
pub struct Id3Store {
    version: Version,
}

impl Default for Id3Store {
    fn default() -> Self {
        // choose v2.4 consistently
        Id3Store {
            version: Version::Id3v24,
        }
    }
}

impl Id3Store {
    pub fn new(version: Version) -> Self {
        Id3Store { version }
    }

    /// Read back the display frames (for `show` and tests).
    pub fn read_presentation(&self, path: &Path) -> Result<Option<Presentation>> {
        read::read_presentation(path)
    }
}

impl TagStore for Id3Store {
    fn read_payload(&self, path: &Path) -> Result<Option<String>> {
        read::read_payload(path)
    }

    fn write_payload(&self, path: &Path, payload: &str) -> Result<()> {
        write::write_payload(path, payload, self.version)
    }

    fn write_presentation(
        &self,
        path: &Path,
        presentation: &Presentation,
        artwork: Option<&Artwork>,
    ) -> Result<()> {
        write::write_presentation(path, presentation, artwork, self.version)
    }
}
