//! core/validate.rs
//!
//! The write-path gate. A record must pass here before it is encoded.
//!
//! - Pure: no IO, never mutates the record
//! - Checks run in a fixed order and stop at the first failure, because
//!   later checks (the version window) assume earlier ones passed
//! - "Today" is injectable so tests do not depend on the wall clock

use chrono::{Local, NaiveDate};
use serde::Deserialize;

use super::error::{ValidationError, ValidationErrorKind as Kind};
use super::types::{FieldId, Record};

const DISC_NUMBERS: [&str; 10] = ["1", "2", "3", "4", "5", "6", "7", "8", "9", "66"];
const MAJOR_VERSIONS: [&str; 3] = ["1", "2", "3"];
const MINOR_VERSIONS: [&str; 3] = ["2", "3", "4"];

/// Validity window of one major version for the windowed persona.
/// `end: None` means still running.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionWindow {
    pub major: u8,
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl VersionWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && self.end.is_none_or(|end| date <= end)
    }

    fn violation(&self) -> String {
        match self.end {
            Some(end) => format!("V{} ended {end}!", self.major),
            None => format!("V{} started {}!", self.major, self.start),
        }
    }
}

/// Business rules the validator enforces.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Oldest date accepted for any record.
    pub epoch_floor: NaiveDate,
    /// Cover artist whose versions are bound to `windows`.
    pub windowed_persona: String,
    pub windows: Vec<VersionWindow>,
    /// Credits that are never accepted (e.g. a duet in the wrong order).
    pub forbidden_cover_artists: Vec<String>,
}

// Evaluated at compile time: a bad literal fails the build.
const fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(y, m, d) {
        Some(date) => date,
        None => panic!("invalid calendar date"),
    }
}

const EPOCH_FLOOR: NaiveDate = ymd(2023, 1, 3);

/// `(major, start, end)` for the default persona.
const DEFAULT_WINDOWS: [(u8, NaiveDate, Option<NaiveDate>); 3] = [
    (1, ymd(2023, 1, 3), Some(ymd(2023, 5, 17))),
    (2, ymd(2023, 5, 27), Some(ymd(2023, 6, 8))),
    (3, ymd(2023, 6, 21), None),
];

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules {
            epoch_floor: EPOCH_FLOOR,
            windowed_persona: "Neuro".to_string(),
            windows: DEFAULT_WINDOWS
                .iter()
                .map(|&(major, start, end)| VersionWindow { major, start, end })
                .collect(),
            forbidden_cover_artists: vec!["Evil & Neuro".to_string()],
        }
    }
}

/// Parsed `<major>[.<minor>]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u8,
    pub minor: Option<u8>,
}

/// Parsed `n` or `n/m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackNumber {
    pub number: u32,
    pub total: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: ValidationRules,
}

impl Validator {
    pub fn new(rules: ValidationRules) -> Self {
        Validator { rules }
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Validate against the local calendar date.
    pub fn validate(&self, record: &Record) -> Result<(), ValidationError> {
        self.validate_on(record, Local::now().date_naive())
    }

    /// Validate as if `today` were the current date.
    pub fn validate_on(&self, record: &Record, today: NaiveDate) -> Result<(), ValidationError> {
        check_disc_number(&record.disc_number)?;
        check_track(&record.track)?;
        let date = self.check_date(&record.date, today)?;
        let version = check_version(&record.version)?;
        self.check_version_window(&record.cover_artist, version, date)?;
        self.check_cover_artist(&record.cover_artist)?;
        check_special(&record.special)?;
        Ok(())
    }

    fn check_date(&self, text: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        if !is_iso_date_shape(text) {
            return Err(ValidationError::new(
                Kind::InvalidDateFormat,
                FieldId::Date,
                "Invalid date format! Use YYYY-MM-DD (e.g., 2025-06-17)",
            ));
        }

        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| {
            ValidationError::new(Kind::InvalidDateFormat, FieldId::Date, "Invalid date!")
        })?;

        if date > today {
            return Err(ValidationError::new(
                Kind::FutureDate,
                FieldId::Date,
                "Future dates are not allowed!",
            ));
        }
        if date < self.rules.epoch_floor {
            return Err(ValidationError::new(
                Kind::DateTooOld,
                FieldId::Date,
                format!("Input date is too old! (oldest is {})", self.rules.epoch_floor),
            ));
        }

        Ok(date)
    }

    fn check_version_window(
        &self,
        cover_artist: &str,
        version: Version,
        date: NaiveDate,
    ) -> Result<(), ValidationError> {
        if cover_artist != self.rules.windowed_persona {
            return Ok(());
        }

        // A major version without a window is unconstrained.
        let Some(window) = self.rules.windows.iter().find(|w| w.major == version.major) else {
            return Ok(());
        };

        if window.contains(date) {
            Ok(())
        } else {
            Err(ValidationError::new(
                Kind::VersionDateWindowViolation,
                FieldId::Version,
                format!("{cover_artist} {}", window.violation()),
            ))
        }
    }

    fn check_cover_artist(&self, cover_artist: &str) -> Result<(), ValidationError> {
        if self.rules.forbidden_cover_artists.iter().any(|c| c == cover_artist) {
            return Err(ValidationError::new(
                Kind::ForbiddenCoverArtistPairing,
                FieldId::CoverArtist,
                "Wrong twin order!",
            ));
        }
        Ok(())
    }
}

fn check_disc_number(text: &str) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::new(
            Kind::InvalidDiscNumber,
            FieldId::DiscNumber,
            "No disc number!",
        ));
    }
    if !DISC_NUMBERS.contains(&text) {
        return Err(ValidationError::new(
            Kind::InvalidDiscNumber,
            FieldId::DiscNumber,
            "Invalid disc number!",
        ));
    }
    Ok(())
}

/// Parse and range-check a track field.
pub fn parse_track(text: &str) -> Option<TrackNumber> {
    let (number, total) = match text.split_once('/') {
        Some((n, m)) => (parse_digits(n)?, Some(parse_digits(m)?)),
        None => (parse_digits(text)?, None),
    };

    if number == 0 {
        return None;
    }
    if total.is_some_and(|total| total == 0 || number > total) {
        return None;
    }

    Some(TrackNumber { number, total })
}

fn check_track(text: &str) -> Result<(), ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::new(
            Kind::InvalidOrMissingTrack,
            FieldId::Track,
            "Missing track number!",
        ));
    }
    match parse_track(text) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new(
            Kind::InvalidOrMissingTrack,
            FieldId::Track,
            "Invalid track number!",
        )),
    }
}

/// Parse a version string and check it against the allowed sets.
pub fn parse_version(text: &str) -> Option<Version> {
    let (major, minor) = match text.split_once('.') {
        Some((major, minor)) => (major, Some(minor)),
        None => (text, None),
    };

    if !MAJOR_VERSIONS.contains(&major) {
        return None;
    }
    if minor.is_some_and(|m| !MINOR_VERSIONS.contains(&m)) {
        return None;
    }

    Some(Version {
        major: major.parse().ok()?,
        minor: match minor {
            Some(m) => Some(m.parse().ok()?),
            None => None,
        },
    })
}

fn check_version(text: &str) -> Result<Version, ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::new(
            Kind::InvalidVersion,
            FieldId::Version,
            "No version!",
        ));
    }
    parse_version(text).ok_or_else(|| {
        ValidationError::new(Kind::InvalidVersion, FieldId::Version, "Invalid version!")
    })
}

fn check_special(text: &str) -> Result<(), ValidationError> {
    match text {
        "0" | "1" => Ok(()),
        _ => Err(ValidationError::new(
            Kind::InvalidSpecialFlag,
            FieldId::Special,
            "Invalid Special! It must be either a '0' or an '1'!",
        )),
    }
}

/// Non-empty, ASCII digits only. Guards `parse` from signs and whitespace.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Exactly `dddd-dd-dd`.
fn is_iso_date_shape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}
