//! Core data types shared between the pipelines and the CLI.
//!
//! Rule of thumb:
//! - These structs should be "boring bags of data"
//! - No filesystem code
//! - No tag parsing code
//!
//! `Record` is the structured provenance metadata for ONE audio file.
//! It is textual on purpose: the validator decides whether the text is
//! meaningful, the codec only cares that it is present.

use std::fmt;

/// Literal written for an absent comment.
pub const NO_COMMENT: &str = "None";

/// Identifies one field of a [`Record`].
///
/// The declaration order is the payload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    Date,
    Title,
    Artist,
    CoverArtist,
    Version,
    DiscNumber,
    Track,
    Comment,
    Special,
    ContentHash,
}

impl FieldId {
    /// Every field, in payload order.
    pub const ALL: [FieldId; 10] = [
        FieldId::Date,
        FieldId::Title,
        FieldId::Artist,
        FieldId::CoverArtist,
        FieldId::Version,
        FieldId::DiscNumber,
        FieldId::Track,
        FieldId::Comment,
        FieldId::Special,
        FieldId::ContentHash,
    ];

    /// Key used for this field inside the embedded payload.
    pub fn key(self) -> &'static str {
        match self {
            FieldId::Date => "Date",
            FieldId::Title => "Title",
            FieldId::Artist => "Artist",
            FieldId::CoverArtist => "CoverArtist",
            FieldId::Version => "Version",
            FieldId::DiscNumber => "Discnumber",
            FieldId::Track => "Track",
            FieldId::Comment => "Comment",
            FieldId::Special => "Special",
            FieldId::ContentHash => "xxHash",
        }
    }

    pub fn from_key(key: &str) -> Option<FieldId> {
        FieldId::ALL.into_iter().find(|f| f.key() == key)
    }

    /// Only the comment may be left empty.
    pub fn is_required(self) -> bool {
        self != FieldId::Comment
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The provenance record embedded in (and read back from) an audio file.
///
/// `comment` is `None` when the user left it blank. `Some("")` and
/// `Some("None")` mean the same thing: [`Record::get`] and equality both
/// compare the textual form, so every way of writing "no comment" is one
/// record.
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub date: String,
    pub title: String,
    pub artist: String,
    pub cover_artist: String,
    pub version: String,
    pub disc_number: String,
    pub track: String,
    pub comment: Option<String>,
    pub special: String,
    pub content_hash: String,
}

impl Record {
    /// Textual value of a field. An absent comment reads as `"None"`.
    pub fn get(&self, field: FieldId) -> &str {
        match field {
            FieldId::Date => &self.date,
            FieldId::Title => &self.title,
            FieldId::Artist => &self.artist,
            FieldId::CoverArtist => &self.cover_artist,
            FieldId::Version => &self.version,
            FieldId::DiscNumber => &self.disc_number,
            FieldId::Track => &self.track,
            FieldId::Comment => self.comment().unwrap_or(NO_COMMENT),
            FieldId::Special => &self.special,
            FieldId::ContentHash => &self.content_hash,
        }
    }

    /// Set a field from its textual form.
    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        let value = value.into();
        match field {
            FieldId::Date => self.date = value,
            FieldId::Title => self.title = value,
            FieldId::Artist => self.artist = value,
            FieldId::CoverArtist => self.cover_artist = value,
            FieldId::Version => self.version = value,
            FieldId::DiscNumber => self.disc_number = value,
            FieldId::Track => self.track = value,
            FieldId::Comment => self.set_comment(&value),
            FieldId::Special => self.special = value,
            FieldId::ContentHash => self.content_hash = value,
        }
    }

    /// The comment, if there really is one.
    pub fn comment(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .filter(|c| !c.is_empty() && *c != NO_COMMENT)
    }

    pub fn set_comment(&mut self, text: &str) {
        self.comment = normalize_comment(text);
    }

    /// First required field (payload order) that is empty.
    pub fn first_missing(&self) -> Option<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|f| f.is_required())
            .find(|f| self.get(*f).is_empty())
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        FieldId::ALL.into_iter().all(|f| self.get(f) == other.get(f))
    }
}

impl Eq for Record {}

/// Empty text and the `"None"` sentinel both mean "no comment".
pub fn normalize_comment(text: &str) -> Option<String> {
    if text.is_empty() || text == NO_COMMENT {
        None
    } else {
        Some(text.to_string())
    }
}

/// Every derived display string for one record.
///
/// `filename` is the sanitized stem: no extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub date: String,
    pub track: String,
    pub comment: String,
    pub filename: String,
}

/// What the tag store writes into the standard presentation frames.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Presentation {
    pub artist: String,
    pub album: String,
    pub album_artist: String,
    pub title: String,
    pub track: String,
    pub disc: String,
    /// First four characters of the rendered comment (its date).
    pub recording_year: String,
    pub comment_primary: String,
    /// Mirrors `comment_primary` for players that only read ID3v1 comments.
    pub comment_legacy: String,
}

impl Presentation {
    pub fn new(rendered: &Rendered, record: &Record, album_artist: &str) -> Self {
        Presentation {
            artist: rendered.artist.clone(),
            album: rendered.album.clone(),
            album_artist: album_artist.to_string(),
            title: rendered.title.clone(),
            track: rendered.track.clone(),
            disc: record.disc_number.clone(),
            recording_year: rendered.comment.chars().take(4).collect(),
            comment_primary: rendered.comment.clone(),
            comment_legacy: rendered.comment.clone(),
        }
    }
}

/// Cover image handed to the tag store as-is.
///
/// `kind` is a short hint like "jpeg" or "png".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artwork {
    pub kind: String,
    pub data: Vec<u8>,
}

impl Artwork {
    /// Only JPEG and PNG are embedded; anything else is ignored.
    pub fn mime_type(&self) -> Option<String> {
        match self.kind.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some("image/jpeg".to_string()),
            "png" => Some("image/png".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_payload_order() {
        let keys: Vec<&str> = FieldId::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            [
                "Date",
                "Title",
                "Artist",
                "CoverArtist",
                "Version",
                "Discnumber",
                "Track",
                "Comment",
                "Special",
                "xxHash"
            ]
        );
        assert_eq!(FieldId::from_key("xxHash"), Some(FieldId::ContentHash));
        assert_eq!(FieldId::from_key("discnumber"), None);
    }

    #[test]
    fn absent_comment_reads_as_sentinel() {
        let mut r = Record::default();
        assert_eq!(r.get(FieldId::Comment), "None");

        r.set(FieldId::Comment, "None");
        assert_eq!(r.comment, None);

        r.set(FieldId::Comment, "first take");
        assert_eq!(r.comment.as_deref(), Some("first take"));
    }

    #[test]
    fn blank_comment_spellings_are_one_record() {
        let blank = Record {
            comment: Some(String::new()),
            ..Record::default()
        };
        let sentinel = Record {
            comment: Some("None".to_string()),
            ..Record::default()
        };
        assert_eq!(blank.get(FieldId::Comment), "None");
        assert_eq!(blank.comment(), None);
        assert_eq!(blank, Record::default());
        assert_eq!(sentinel, Record::default());

        let commented = Record {
            comment: Some("x".to_string()),
            ..Record::default()
        };
        assert_ne!(commented, Record::default());
    }

    #[test]
    fn first_missing_skips_comment() {
        let mut r = Record::default();
        for f in FieldId::ALL {
            if f != FieldId::Comment {
                r.set(f, "x");
            }
        }
        assert_eq!(r.first_missing(), None);

        r.title.clear();
        assert_eq!(r.first_missing(), Some(FieldId::Title));
    }

    #[test]
    fn presentation_takes_year_from_comment() {
        let rendered = Rendered {
            comment: "2023-05-17 //karaoke night".to_string(),
            ..Rendered::default()
        };
        let record = Record {
            disc_number: "66".to_string(),
            ..Record::default()
        };
        let p = Presentation::new(&rendered, &record, "Someone");
        assert_eq!(p.recording_year, "2023");
        assert_eq!(p.disc, "66");
        assert_eq!(p.comment_legacy, p.comment_primary);
    }

    #[test]
    fn artwork_accepts_jpeg_and_png_only() {
        let art = |k: &str| Artwork {
            kind: k.to_string(),
            data: vec![1, 2, 3],
        };
        assert_eq!(art("JPEG").mime_type().as_deref(), Some("image/jpeg"));
        assert_eq!(art("png").mime_type().as_deref(), Some("image/png"));
        assert_eq!(art("gif").mime_type(), None);
    }
}
