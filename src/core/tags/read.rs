//! core/tags/read.rs
//! Pull the embedded payload (and the display frames) out of an MP3.

use std::path::Path;

use id3::{Tag, TagLike};

use super::super::error::Result;
use super::super::payload::PAYLOAD_PREFIX;
use super::super::types::Presentation;
use super::util::{find_comment, read_tag, text_frame};
use super::{DISPLAY_LANG, LEGACY_COMMENT_DESC, PAYLOAD_LANG};

pub(crate) fn read_payload(path: &Path) -> Result<Option<String>> {
    Ok(read_tag(path)?.and_then(|tag| payload_from_tag(&tag)))
}

/// Prefer the `ved` comment. Older files may carry the payload in some other
/// comment, so fall back to anything that looks like one.
fn payload_from_tag(tag: &Tag) -> Option<String> {
    tag.comments()
        .find(|c| c.lang == PAYLOAD_LANG)
        .or_else(|| tag.comments().find(|c| c.text.starts_with(PAYLOAD_PREFIX)))
        .map(|c| c.text.clone())
}

pub(crate) fn read_presentation(path: &Path) -> Result<Option<Presentation>> {
    let Some(tag) = read_tag(path)? else {
        return Ok(None);
    };

    Ok(Some(Presentation {
        artist: tag.artist().unwrap_or_default().to_string(),
        album: tag.album().unwrap_or_default().to_string(),
        album_artist: tag.album_artist().unwrap_or_default().to_string(),
        title: tag.title().unwrap_or_default().to_string(),
        track: text_frame(&tag, "TRCK").unwrap_or_default(),
        disc: text_frame(&tag, "TPOS").unwrap_or_default(),
        recording_year: text_frame(&tag, "TDRC").unwrap_or_default(),
        comment_primary: find_comment(&tag, DISPLAY_LANG, "").unwrap_or_default(),
        comment_legacy: find_comment(&tag, DISPLAY_LANG, LEGACY_COMMENT_DESC)
            .unwrap_or_default(),
    }))
}
