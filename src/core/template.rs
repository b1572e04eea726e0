//! core/template.rs
//!
//! Expands patterns like `"%N. %a - %t (%c.v%v)"` against a [`Record`].
//!
//! Token table:
//! - primary (one field each): `%t` Title, `%a` Artist, `%D` Date, `%c` CoverArtist,
//!   `%v` Version, `%A` Discnumber, `%T_n` Track, `%C` Comment
//! - secondary (computed from the whole record): `%N` 3-digit track ordinal
//!
//! A pattern is tokenized once, left to right, longest token first.
//! Substituted values are never scanned again, so a title that happens to
//! contain `%a` stays literal. Anything after a `%` that is not a known
//! token is kept verbatim: patterns are trusted configuration, not input.

use std::fmt;

use serde::Deserialize;

use super::sanitize::sanitize;
use super::types::{FieldId, Record, Rendered};

/// Values computed from the whole record rather than one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Derivation {
    /// Track number before any `/`, zero-padded to 3 digits.
    TrackOrdinal,
}

impl Derivation {
    fn apply(self, record: &Record) -> String {
        match self {
            Derivation::TrackOrdinal => derive_track(&record.track),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Primary(FieldId),
    Secondary(Derivation),
}

// Longest first: `%T_n` must win over any two-char prefix.
const TOKENS: [(&str, Token); 9] = [
    ("%T_n", Token::Primary(FieldId::Track)),
    ("%t", Token::Primary(FieldId::Title)),
    ("%a", Token::Primary(FieldId::Artist)),
    ("%D", Token::Primary(FieldId::Date)),
    ("%c", Token::Primary(FieldId::CoverArtist)),
    ("%v", Token::Primary(FieldId::Version)),
    ("%A", Token::Primary(FieldId::DiscNumber)),
    ("%C", Token::Primary(FieldId::Comment)),
    ("%N", Token::Secondary(Derivation::TrackOrdinal)),
];

impl Token {
    fn resolve(self, record: &Record) -> String {
        match self {
            Token::Primary(field) => record.get(field).to_string(),
            Token::Secondary(derivation) => derivation.apply(record),
        }
    }
}

/// `"7/200"` -> `"007"`, `"42"` -> `"042"`. Longer numbers are kept whole.
pub fn derive_track(track: &str) -> String {
    let head = match track.split_once('/') {
        Some((head, _)) => head,
        None => track,
    };
    format!("{head:0>3}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// A tokenized pattern string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = tokenize(&source);
        Pattern { source, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn expand(&self, record: &Record) -> String {
        let mut out = String::with_capacity(self.source.len() + 64);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(token) => out.push_str(&token.resolve(record)),
            }
        }
        out
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Pattern::new(source)
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Pattern::new(source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn tokenize(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(c) = rest.chars().next() {
        let token = if c == '%' {
            TOKENS.iter().find(|(text, _)| rest.starts_with(text))
        } else {
            None
        };

        match token {
            Some((text, token)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Token(*token));
                rest = &rest[text.len()..];
            }
            None => {
                literal.push(c);
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}

/// Convenience: tokenize + expand in one go.
pub fn expand(pattern: &str, record: &Record) -> String {
    Pattern::new(pattern).expand(record)
}

/// Boolean conditions that pick the second member of a pattern pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// CoverArtist contains the duet join character.
    DuetCredit(char),
    /// Comment is empty or the `"None"` sentinel.
    NoComment,
}

impl Condition {
    pub fn holds(self, record: &Record) -> bool {
        match self {
            Condition::DuetCredit(join) => record.cover_artist.contains(join),
            Condition::NoComment => record.comment().is_none(),
        }
    }
}

/// One output's pattern: either fixed, or a pair chosen by a [`Condition`].
///
/// In TOML: `title = "%t"` or `artist = { primary = "...", secondary = "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PatternChoice {
    Single(Pattern),
    Pair { primary: Pattern, secondary: Pattern },
}

impl PatternChoice {
    pub fn pair(primary: &str, secondary: &str) -> Self {
        PatternChoice::Pair {
            primary: Pattern::new(primary),
            secondary: Pattern::new(secondary),
        }
    }

    pub fn select(&self, record: &Record, condition: Condition) -> &Pattern {
        match self {
            PatternChoice::Single(p) => p,
            PatternChoice::Pair { primary, secondary } => {
                if condition.holds(record) {
                    secondary
                } else {
                    primary
                }
            }
        }
    }
}

impl From<&str> for PatternChoice {
    fn from(source: &str) -> Self {
        PatternChoice::Single(Pattern::new(source))
    }
}

/// Patterns for every derived output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PatternSet {
    pub filename: PatternChoice,
    pub title: PatternChoice,
    pub artist: PatternChoice,
    pub date: PatternChoice,
    pub album: PatternChoice,
    pub comment: PatternChoice,
    pub track: PatternChoice,
    /// Joins two personas in a duet credit ("Foo & Bar").
    pub duet_join: char,
}

impl Default for PatternSet {
    fn default() -> Self {
        PatternSet {
            filename: PatternChoice::pair("%N. %a - %t (%c.v%v)", "%N. %a - %t (Duet.v%v) (%c)"),
            title: "%t".into(),
            artist: PatternChoice::pair("%c - %a", "Duet (%c) - %a"),
            date: "%D".into(),
            album: "Disc %A".into(),
            comment: PatternChoice::pair("%D //%C", "%D"),
            track: "%T_n".into(),
            duet_join: '&',
        }
    }
}

impl PatternSet {
    /// Expand every output. `filename` comes back sanitized, without extension.
    pub fn render(&self, record: &Record) -> Rendered {
        let duet = Condition::DuetCredit(self.duet_join);
        let out = |choice: &PatternChoice, condition: Condition| {
            choice.select(record, condition).expand(record)
        };

        Rendered {
            title: out(&self.title, duet),
            artist: out(&self.artist, duet),
            album: out(&self.album, duet),
            date: out(&self.date, duet),
            track: out(&self.track, duet),
            comment: out(&self.comment, Condition::NoComment),
            filename: sanitize(&out(&self.filename, duet)),
        }
    }
}
