//! Configuration loading.
//!
//! Everything has a compiled default; a TOML file only needs the keys it
//! changes:
//!
//! ```toml
//! album_artist = "QueenPb + vedal987"
//!
//! [patterns]
//! album = "Disc %A"
//! artist = { primary = "%c - %a", secondary = "Duet (%c) - %a" }
//!
//! [rules]
//! epoch_floor = "2023-01-03"
//! windowed_persona = "Neuro"
//! forbidden_cover_artists = ["Evil & Neuro"]
//!
//! [[rules.windows]]
//! major = 3
//! start = "2023-06-21"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::error::{Error, Result};
use super::template::PatternSet;
use super::validate::ValidationRules;

pub const DEFAULT_ALBUM_ARTIST: &str = "QueenPb + vedal987";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Written to TPE2 on every rendered file.
    pub album_artist: String,
    pub patterns: PatternSet,
    pub rules: ValidationRules,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            album_artist: DEFAULT_ALBUM_ARTIST.to_string(),
            patterns: PatternSet::default(),
            rules: ValidationRules::default(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    /// Load from `path`, or fall back to compiled defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let Some(path) = path else {
            debug!("no config file given, using defaults");
            return Ok(Config::default());
        };

        let text = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let config = Config::from_toml(&text)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        let mut majors: Vec<u8> = self.rules.windows.iter().map(|w| w.major).collect();
        majors.sort_unstable();
        if majors.windows(2).any(|w| w[0] == w[1]) {
            return Err(Error::Config(
                "rules.windows lists the same major version twice".to_string(),
            ));
        }

        for w in &self.rules.windows {
            if w.end.is_some_and(|end| end < w.start) {
                return Err(Error::Config(format!(
                    "rules.windows: V{} ends before it starts",
                    w.major
                )));
            }
        }

        let mut by_start: Vec<_> = self.rules.windows.iter().collect();
        by_start.sort_by_key(|w| w.start);
        for pair in by_start.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.end.is_none_or(|end| end >= b.start) {
                return Err(Error::Config(format!(
                    "rules.windows: V{} and V{} overlap",
                    a.major, b.major
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::template::PatternChoice;
    use chrono::NaiveDate;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn no_path_is_defaults() {
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn overrides_rules_and_patterns() {
        let config = Config::from_toml(
            r#"
            album_artist = "Somebody"

            [patterns]
            album = "Volume %A"

            [rules]
            epoch_floor = "2022-12-31"

            [[rules.windows]]
            major = 1
            start = "2022-12-31"
            end = "2023-05-17"
            "#,
        )
        .unwrap();

        assert_eq!(config.album_artist, "Somebody");
        assert_eq!(config.patterns.album, PatternChoice::from("Volume %A"));
        assert_eq!(config.rules.epoch_floor, NaiveDate::from_ymd_opt(2022, 12, 31).unwrap());
        assert_eq!(config.rules.windows.len(), 1);
        assert_eq!(config.rules.windowed_persona, "Neuro");
    }

    #[test]
    fn duplicate_window_rejected() {
        let err = Config::from_toml(
            r#"
            [[rules.windows]]
            major = 1
            start = "2023-01-01"

            [[rules.windows]]
            major = 1
            start = "2023-02-01"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn inverted_window_rejected() {
        let err = Config::from_toml(
            r#"
            [[rules.windows]]
            major = 2
            start = "2023-06-08"
            end = "2023-05-27"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn overlapping_windows_rejected() {
        let err = Config::from_toml(
            r#"
            [[rules.windows]]
            major = 1
            start = "2023-01-03"
            end = "2023-05-27"

            [[rules.windows]]
            major = 2
            start = "2023-05-27"
            end = "2023-06-08"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("overlap"), "{err}");

        // An open-ended window must be the last one.
        let err = Config::from_toml(
            r#"
            [[rules.windows]]
            major = 3
            start = "2023-01-03"

            [[rules.windows]]
            major = 2
            start = "2023-05-27"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn default_windows_pass_the_check() {
        assert!(Config::default().check().is_ok());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(matches!(
            Config::from_toml("albumartist = \"x\""),
            Err(Error::ConfigParse(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("nope.toml"));
    }
}
