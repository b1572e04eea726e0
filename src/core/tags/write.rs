//! core/tags/write.rs
//! Write the payload / presentation frames back to an MP3.

use std::path::Path;

use id3::{TagLike, Version};
use tracing::debug;

use super::super::error::Result;
use super::super::types::{Artwork, Presentation};
use super::art::apply_artwork;
use super::util::{put_comment, read_tag_or_new, set_text_or_remove};
use super::{DISPLAY_LANG, LEGACY_COMMENT_DESC, PAYLOAD_LANG};

pub(crate) fn write_payload(path: &Path, payload: &str, version: Version) -> Result<()> {
    let mut tag = read_tag_or_new(path)?;
    put_comment(&mut tag, PAYLOAD_LANG, "", payload);
    tag.write_to_path(path, version)?;
    debug!(path = %path.display(), "payload written");
    Ok(())
}

pub(crate) fn write_presentation(
    path: &Path,
    p: &Presentation,
    artwork: Option<&Artwork>,
    version: Version,
) -> Result<()> {
    let mut tag = read_tag_or_new(path)?;

    // User-defined frames left by other taggers are dropped.
    let _ = tag.remove("TXXX");

    set_text_or_remove(&mut tag, "TPE1", &p.artist);
    set_text_or_remove(&mut tag, "TALB", &p.album);
    set_text_or_remove(&mut tag, "TIT2", &p.title);
    set_text_or_remove(&mut tag, "TRCK", &p.track);
    set_text_or_remove(&mut tag, "TPE2", &p.album_artist);
    set_text_or_remove(&mut tag, "TDRC", &p.recording_year);
    set_text_or_remove(&mut tag, "TPOS", &p.disc);

    put_comment(&mut tag, DISPLAY_LANG, "", &p.comment_primary);
    put_comment(&mut tag, DISPLAY_LANG, LEGACY_COMMENT_DESC, &p.comment_legacy);

    if let Some(art) = artwork {
        apply_artwork(&mut tag, art);
    }

    tag.write_to_path(path, version)?;
    debug!(path = %path.display(), "presentation frames written");
    Ok(())
}
