use std::path::Path;

use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike};
use tracing::{debug, warn};

use super::super::error::Result;
use super::super::types::Artwork;
use super::util::read_tag;

/// Replace every embedded picture with `art` as the front cover.
/// Unsupported image kinds leave the existing pictures untouched.
pub(crate) fn apply_artwork(tag: &mut Tag, art: &Artwork) {
    let Some(mime_type) = art.mime_type() else {
        warn!(kind = %art.kind, "unsupported artwork type, skipped");
        return;
    };
    if art.data.is_empty() {
        return;
    }

    tag.remove_all_pictures();
    let _ = tag.add_frame(Picture {
        mime_type,
        picture_type: PictureType::CoverFront,
        description: "Cover (Front)".to_string(),
        data: art.data.clone(),
    });
    debug!("artwork added to APIC frame");
}

/// The front cover as `(bytes, mime)`; any picture if none is marked front.
pub fn read_embedded_art(path: &Path) -> Result<Option<(Vec<u8>, String)>> {
    let Some(tag) = read_tag(path)? else {
        return Ok(None);
    };

    let cover = tag
        .pictures()
        .find(|p| p.picture_type == PictureType::CoverFront)
        .or_else(|| tag.pictures().next());

    Ok(cover.map(|p| (p.data.clone(), p.mime_type.clone())))
}
