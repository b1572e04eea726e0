//! core/payload.rs
//!
//! Canonical payload codec.
//!
//! The payload is a flat JSON object with exactly these keys, in this order:
//! `Date, Title, Artist, CoverArtist, Version, Discnumber, Track, Comment, Special, xxHash`.
//! It is the only compatibility-sensitive surface: files written years ago
//! must keep decoding, so the layout is compact (no whitespace) and fixed.
//!
//! - `encode` refuses incomplete records (`PayloadError::MissingField`)
//! - `decode` only checks structure, never field semantics

use serde_json::{Map, Value};

use super::error::PayloadError;
use super::types::{FieldId, Record};

/// Every payload starts with this. Used to spot payloads in legacy comment frames.
pub const PAYLOAD_PREFIX: &str = "{\"Date\":";

/// Serialize a record into its canonical payload text.
///
/// Walks the fields in payload order and fails on the first empty required one.
/// An absent comment is written as `"None"`.
pub fn encode(record: &Record) -> Result<String, PayloadError> {
    if let Some(field) = record.first_missing() {
        return Err(PayloadError::MissingField { field });
    }

    let mut out = String::with_capacity(256);
    out.push('{');

    for (i, field) in FieldId::ALL.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&json_string(field.key()));
        out.push(':');
        out.push_str(&json_string(record.get(field)));
    }

    out.push('}');
    Ok(out)
}

/// Parse payload text back into a record.
pub fn decode(text: &str) -> Result<Record, PayloadError> {
    let map: Map<String, Value> = serde_json::from_str(text).map_err(|e| PayloadError::Malformed {
        reason: e.to_string(),
    })?;

    let mut record = Record::default();
    for field in FieldId::ALL {
        let value = match map.get(field.key()) {
            Some(Value::String(s)) => s,
            Some(other) => {
                return Err(PayloadError::Malformed {
                    reason: format!("{} is not a string: {other}", field.key()),
                });
            }
            None => {
                return Err(PayloadError::Malformed {
                    reason: format!("missing key {}", field.key()),
                });
            }
        };

        // Comment goes through the same empty/"None" normalisation as user input.
        record.set(field, value.as_str());
    }

    Ok(record)
}

/// Quote + escape one value. Plain text (no quotes, backslashes or control
/// characters) comes out as `"text"`, same as the legacy writer produced.
fn json_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}
