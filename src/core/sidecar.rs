//! core/sidecar.rs
//!
//! Per-track field files: the raw input of the build path.
//!
//! A sidecar is an HJSON object using the payload keys. Plain JSON is
//! valid HJSON, so both kinds of file load:
//!
//! ```hjson
//! {
//!   # disc 3, karaoke night
//!   Date: "2023-06-21"
//!   Title: Some Song
//!   Version: 3.2
//!   Track: "7/200"
//! }
//! ```
//!
//! - Numbers are accepted and kept in their written form (`3.2` -> `"3.2"`)
//! - `null` and missing keys become empty text; the validator / encoder
//!   decide whether that is acceptable
//! - Unknown keys are ignored with a warning

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::warn;

use super::error::{Error, Result};
use super::types::{FieldId, Record};

pub fn load(path: &Path) -> Result<Record> {
    let text = fs::read_to_string(path)?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<Record> {
    let map: Map<String, Value> = deser_hjson::from_str(text).map_err(|e| Error::Sidecar {
        reason: e.to_string(),
    })?;
    let mut record = Record::default();

    for (key, value) in &map {
        let Some(field) = FieldId::from_key(key) else {
            warn!(key = %key, "unknown sidecar key ignored");
            continue;
        };

        let text = match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Null => String::new(),
            other => {
                return Err(Error::Sidecar {
                    reason: format!("{key} must be text or a number, got {other}"),
                });
            }
        };
        record.set(field, text);
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_and_numbers() {
        let r = parse(
            r#"{
                "Date": "2023-06-21",
                "Title": "Song",
                "Artist": "Band",
                "CoverArtist": "Neuro",
                "Version": 3.2,
                "Discnumber": 66,
                "Track": "7/200",
                "Special": 0
            }"#,
        )
        .unwrap();

        assert_eq!(r.version, "3.2");
        assert_eq!(r.disc_number, "66");
        assert_eq!(r.special, "0");
        assert_eq!(r.comment, None);
        assert_eq!(r.content_hash, "");
    }

    #[test]
    fn null_comment_is_absent() {
        let r = parse(r#"{"Comment": null, "xxHash": "ab"}"#).unwrap();
        assert_eq!(r.comment, None);
        assert_eq!(r.content_hash, "ab");
    }

    #[test]
    fn hjson_with_comments_and_quoteless_values() {
        let r = parse(
            r#"{
                # field file, disc 66
                Date: "2023-06-21"
                Title: Some Song
                Artist: Original Band
                // persona
                CoverArtist: Neuro
                Version: 3.2
                Discnumber: 66
                Track: "7/200"
                Comment: first stream
                Special: 0
            }"#,
        )
        .unwrap();

        assert_eq!(r.date, "2023-06-21");
        assert_eq!(r.title, "Some Song");
        assert_eq!(r.artist, "Original Band");
        assert_eq!(r.cover_artist, "Neuro");
        assert_eq!(r.version, "3.2");
        assert_eq!(r.disc_number, "66");
        assert_eq!(r.track, "7/200");
        assert_eq!(r.comment(), Some("first stream"));
        assert_eq!(r.special, "0");
    }

    #[test]
    fn rejects_nested_values() {
        assert!(matches!(
            parse(r#"{"Title": ["a"]}"#),
            Err(Error::Sidecar { .. })
        ));
        assert!(matches!(
            parse(r#"["not", "an", "object"]"#),
            Err(Error::Sidecar { .. })
        ));
    }

    #[test]
    fn unknown_keys_ignored() {
        let r = parse(r#"{"Title": "T", "Mood": "happy"}"#).unwrap();
        assert_eq!(r.title, "T");
    }
}
