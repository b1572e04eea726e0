//! core/tags/util.rs
//! Small helpers shared by tag reading/writing.

use std::path::Path;

use id3::frame::{Comment, Content};
use id3::{ErrorKind, Tag, TagLike};

use super::super::error::Result;

/// Read the tag of `path`. A file without any tag is `Ok(None)`.
pub(crate) fn read_tag(path: &Path) -> Result<Option<Tag>> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load the existing tag, or start fresh if there is none.
pub(crate) fn read_tag_or_new(path: &Path) -> Result<Tag> {
    Ok(read_tag(path)?.unwrap_or_else(Tag::new))
}

/// Get the first plain text value of a frame id ("TPE2", "TPOS", ...).
pub(crate) fn text_frame(tag: &Tag, id: &str) -> Option<String> {
    let frame = tag.get(id)?;
    match frame.content() {
        Content::Text(s) => Some(s.clone()),
        _ => None,
    }
}

/// Set a text frame, or remove it when the value is empty.
pub(crate) fn set_text_or_remove(tag: &mut Tag, id: &str, value: &str) {
    if value.is_empty() {
        let _ = tag.remove(id); // TagLike::remove returns Vec<Frame>; discard it
    } else {
        tag.set_text(id, value);
    }
}

/// Add or replace the comment identified by (lang, description).
/// Comments in other languages/descriptions are left alone.
pub(crate) fn put_comment(tag: &mut Tag, lang: &str, description: &str, text: &str) {
    let _ = tag.add_frame(Comment {
        lang: lang.to_string(),
        description: description.to_string(),
        text: text.to_string(),
    });
}

/// Text of the comment identified by (lang, description).
pub(crate) fn find_comment(tag: &Tag, lang: &str, description: &str) -> Option<String> {
    tag.comments()
        .find(|c| c.lang == lang && c.description == description)
        .map(|c| c.text.clone())
}
