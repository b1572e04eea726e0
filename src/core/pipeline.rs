//! core/pipeline.rs
//!
//! The two directions a file goes through:
//!
//! - build:  fields -> validate -> encode -> write payload
//! - render: read payload -> decode -> expand patterns -> sanitize
//!   -> write presentation frames -> (optional) rename
//!
//! Every error is scoped to one file. The batch helpers turn errors into a
//! per-file [`Outcome`] and keep going.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use super::config::Config;
use super::error::{Error, PayloadError, RenameError, Result};
use super::hash::content_hash;
use super::payload;
use super::rename::{RenameOutcome, check_target, rename_to_stem};
use super::sidecar;
use super::tags::TagStore;
use super::types::{Artwork, Presentation, Record, Rendered};
use super::validate::Validator;

/// Knobs for the render direction.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Rename files to their rendered filename.
    pub rename: bool,
    /// Compute everything, write nothing.
    pub dry_run: bool,
    pub artwork: Option<Artwork>,
}

/// What happened to one file in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Engraved,
    Rendered { renamed_to: Option<PathBuf> },
    NoPayload,
    Malformed(String),
    Invalid(String),
    Incomplete(String),
    Collision(PathBuf),
    Failed(String),
}

impl Outcome {
    fn from_error(err: Error) -> Outcome {
        match err {
            Error::Payload(PayloadError::Malformed { reason }) => Outcome::Malformed(reason),
            Error::Payload(PayloadError::MissingField { field }) => Outcome::Incomplete(field.to_string()),
            Error::Validation(e) => Outcome::Invalid(e.to_string()),
            Error::Rename(RenameError::Collision { target_path }) => Outcome::Collision(target_path),
            other => Outcome::Failed(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Engraved | Outcome::Rendered { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Per-file results of a batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    fn push(&mut self, path: &Path, outcome: Outcome) {
        self.files.push(FileReport {
            path: path.to_path_buf(),
            outcome,
        });
    }

    pub fn succeeded(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_success()).count()
    }

    pub fn skipped(&self) -> usize {
        self.files.len() - self.succeeded()
    }

    pub fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.files.iter().filter(|f| pred(&f.outcome)).count()
    }
}

/// Everything needed to process files: where tags live, the rules, and
/// which day counts as "today".
pub struct Pipeline<S> {
    store: S,
    config: Config,
    validator: Validator,
    today: NaiveDate,
}

impl<S: TagStore> Pipeline<S> {
    pub fn new(store: S, config: Config) -> Self {
        let validator = Validator::new(config.rules.clone());
        Pipeline {
            store,
            config,
            validator,
            today: Local::now().date_naive(),
        }
    }

    /// Pin "today" (future-date checks).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gate + encode. Nothing invalid or incomplete gets past here.
    pub fn build_payload(&self, record: &Record) -> Result<String> {
        self.validator.validate_on(record, self.today)?;
        Ok(payload::encode(record)?)
    }

    /// Embed `record` into `path`. A missing content hash is computed from
    /// the file. Returns the record as written.
    pub fn engrave(&self, path: &Path, mut record: Record, dry_run: bool) -> Result<Record> {
        if record.content_hash.is_empty() {
            record.content_hash = content_hash(path)?;
            debug!(path = %path.display(), hash = %record.content_hash, "content hash computed");
        }

        let text = self.build_payload(&record)?;
        if !dry_run {
            self.store.write_payload(path, &text)?;
        }
        info!(path = %path.display(), dry_run, "payload engraved");
        Ok(record)
    }

    /// Decode the payload of `path`. `Ok(None)` if it has none.
    pub fn read_record(&self, path: &Path) -> Result<Option<Record>> {
        let Some(text) = self.store.read_payload(path)? else {
            return Ok(None);
        };
        Ok(Some(payload::decode(&text)?))
    }

    pub fn render(&self, record: &Record) -> Rendered {
        self.config.patterns.render(record)
    }

    pub fn presentation(&self, record: &Record, rendered: &Rendered) -> Presentation {
        Presentation::new(rendered, record, &self.config.album_artist)
    }

    /// Render one file: rewrite its display frames and optionally rename it.
    ///
    /// A rename collision is reported before anything is written, so a
    /// skipped file keeps its bytes.
    pub fn render_file(&self, path: &Path, opts: &RenderOptions) -> Result<Outcome> {
        let Some(record) = self.read_record(path)? else {
            debug!(path = %path.display(), "no payload found");
            return Ok(Outcome::NoPayload);
        };

        let rendered = self.render(&record);
        if opts.rename {
            check_target(path, &rendered.filename)?;
        }
        if !opts.dry_run {
            let presentation = self.presentation(&record, &rendered);
            self.store
                .write_presentation(path, &presentation, opts.artwork.as_ref())?;
        }

        let renamed_to = if opts.rename {
            match rename_to_stem(path, &rendered.filename, opts.dry_run)? {
                RenameOutcome::Unchanged => None,
                RenameOutcome::Renamed { to, .. } | RenameOutcome::Planned { to, .. } => Some(to),
            }
        } else {
            None
        };

        Ok(Outcome::Rendered { renamed_to })
    }

    /// Render every path; a failing file never stops the batch.
    pub fn render_all(&self, paths: &[PathBuf], opts: &RenderOptions) -> BatchReport {
        let mut report = BatchReport::default();

        for path in paths {
            let outcome = self
                .render_file(path, opts)
                .unwrap_or_else(Outcome::from_error);
            log_outcome(path, &outcome);
            report.push(path, outcome);
        }

        report
    }

    /// Engrave each `(audio, sidecar)` pair; a failing file never stops the batch.
    pub fn engrave_all(&self, jobs: &[(PathBuf, PathBuf)], dry_run: bool) -> BatchReport {
        let mut report = BatchReport::default();

        for (audio, fields) in jobs {
            let outcome = sidecar::load(fields)
                .and_then(|record| self.engrave(audio, record, dry_run))
                .map(|_| Outcome::Engraved)
                .unwrap_or_else(Outcome::from_error);
            log_outcome(audio, &outcome);
            report.push(audio, outcome);
        }

        report
    }
}

/// Sidecar next to an audio file: `song.mp3` -> `song.hjson` if present,
/// else `song.json`.
pub fn sidecar_path_for(audio: &Path) -> PathBuf {
    let hjson = audio.with_extension("hjson");
    if hjson.exists() {
        hjson
    } else {
        audio.with_extension("json")
    }
}

fn log_outcome(path: &Path, outcome: &Outcome) {
    let path = path.display();
    match outcome {
        Outcome::Engraved | Outcome::Rendered { renamed_to: None } => {}
        Outcome::Rendered { renamed_to: Some(to) } => {
            debug!(%path, to = %to.display(), "rendered and renamed")
        }
        Outcome::NoPayload => debug!(%path, "skipped: nothing to render"),
        Outcome::Malformed(reason) => warn!(%path, %reason, "skipped: malformed payload"),
        Outcome::Invalid(reason) => warn!(%path, %reason, "skipped: invalid fields"),
        Outcome::Incomplete(field) => warn!(%path, %field, "skipped: missing field"),
        Outcome::Collision(target) => {
            warn!(%path, target = %target.display(), "skipped: target already exists")
        }
        Outcome::Failed(reason) => warn!(%path, %reason, "skipped: failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;

    use crate::core::types::FieldId;

    /// Tag store kept in memory, keyed by path.
    #[derive(Default)]
    struct MemoryStore {
        payloads: RefCell<HashMap<PathBuf, String>>,
        presentations: RefCell<HashMap<PathBuf, Presentation>>,
    }

    impl TagStore for MemoryStore {
        fn read_payload(&self, path: &Path) -> Result<Option<String>> {
            Ok(self.payloads.borrow().get(path).cloned())
        }

        fn write_payload(&self, path: &Path, payload: &str) -> Result<()> {
            self.payloads
                .borrow_mut()
                .insert(path.to_path_buf(), payload.to_string());
            Ok(())
        }

        fn write_presentation(
            &self,
            path: &Path,
            presentation: &Presentation,
            _artwork: Option<&Artwork>,
        ) -> Result<()> {
            self.presentations
                .borrow_mut()
                .insert(path.to_path_buf(), presentation.clone());
            Ok(())
        }
    }

    fn pipeline() -> Pipeline<MemoryStore> {
        Pipeline::new(MemoryStore::default(), Config::default())
            .with_today(NaiveDate::from_ymd_opt(2025, 6, 17).unwrap())
    }

    fn record() -> Record {
        Record {
            date: "2023-06-21".to_string(),
            title: "Song".to_string(),
            artist: "Band".to_string(),
            cover_artist: "Neuro".to_string(),
            version: "3".to_string(),
            disc_number: "2".to_string(),
            track: "4/10".to_string(),
            comment: None,
            special: "0".to_string(),
            content_hash: "feedface00000000".to_string(),
        }
    }

    #[test]
    fn build_refuses_invalid_records() {
        let p = pipeline();
        let r = Record { cover_artist: "Evil & Neuro".into(), ..record() };
        assert!(matches!(p.build_payload(&r), Err(Error::Validation(_))));

        let r = Record { title: String::new(), ..record() };
        assert!(matches!(
            p.build_payload(&r),
            Err(Error::Payload(PayloadError::MissingField { field: FieldId::Title }))
        ));
    }

    #[test]
    fn engrave_then_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw take.mp3");
        fs::write(&path, b"audio").unwrap();

        let p = pipeline();
        p.engrave(&path, record(), false).unwrap();
        assert_eq!(p.read_record(&path).unwrap(), Some(record()));

        let opts = RenderOptions { rename: true, ..Default::default() };
        let outcome = p.render_file(&path, &opts).unwrap();
        let target = dir.path().join("004. Band - Song (Neuro.v3).mp3");
        assert_eq!(outcome, Outcome::Rendered { renamed_to: Some(target.clone()) });
        assert!(target.exists());

        let presentations = p.store().presentations.borrow();
        let shown = &presentations[&path];
        assert_eq!(shown.artist, "Neuro - Band");
        assert_eq!(shown.album, "Disc 2");
        assert_eq!(shown.disc, "2");
        assert_eq!(shown.comment_primary, "2023-06-21");
        assert_eq!(shown.recording_year, "2023");
        assert_eq!(shown.album_artist, "QueenPb + vedal987");
    }

    #[test]
    fn engrave_fills_missing_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, b"some audio bytes").unwrap();

        let written = pipeline()
            .engrave(&path, Record { content_hash: String::new(), ..record() }, true)
            .unwrap();
        assert_eq!(written.content_hash, content_hash(&path).unwrap());
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.mp3");
        fs::write(&path, b"x").unwrap();

        let p = pipeline();
        p.engrave(&path, record(), true).unwrap();
        assert_eq!(p.read_record(&path).unwrap(), None);
    }

    #[test]
    fn batch_skips_bad_files_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline();

        let good = dir.path().join("good.mp3");
        let empty = dir.path().join("empty.mp3");
        let broken = dir.path().join("broken.mp3");
        let twin = dir.path().join("twin.mp3");
        for f in [&good, &empty, &broken, &twin] {
            fs::write(f, b"x").unwrap();
        }

        p.store().write_payload(&good, &payload::encode(&record()).unwrap()).unwrap();
        p.store().write_payload(&broken, "{\"Date\":").unwrap();
        // Same record twice -> same target name.
        p.store().write_payload(&twin, &payload::encode(&record()).unwrap()).unwrap();

        let opts = RenderOptions { rename: true, ..Default::default() };
        let report = p.render_all(&[broken.clone(), empty.clone(), good.clone(), twin.clone()], &opts);

        let outcomes: Vec<&Outcome> = report.files.iter().map(|f| &f.outcome).collect();
        assert!(matches!(outcomes[0], Outcome::Malformed(_)));
        assert_eq!(outcomes[1], &Outcome::NoPayload);
        assert!(matches!(outcomes[2], Outcome::Rendered { renamed_to: Some(_) }));
        assert!(matches!(outcomes[3], Outcome::Collision(_)));
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.skipped(), 3);
        assert!(twin.exists());
    }

    #[test]
    fn collision_writes_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline();

        let path = dir.path().join("a.mp3");
        fs::write(&path, b"x").unwrap();
        fs::write(dir.path().join("004. Band - Song (Neuro.v3).mp3"), b"taken").unwrap();
        p.store().write_payload(&path, &payload::encode(&record()).unwrap()).unwrap();

        let opts = RenderOptions { rename: true, ..Default::default() };
        let err = p.render_file(&path, &opts).unwrap_err();
        assert!(matches!(err, Error::Rename(RenameError::Collision { .. })));
        assert!(p.store().presentations.borrow().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn sidecar_prefers_hjson() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("song.mp3");
        assert_eq!(sidecar_path_for(&audio), dir.path().join("song.json"));

        fs::write(dir.path().join("song.hjson"), b"{}").unwrap();
        assert_eq!(sidecar_path_for(&audio), dir.path().join("song.hjson"));
    }

    #[test]
    fn engrave_all_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline();

        let ok_audio = dir.path().join("ok.mp3");
        let bad_audio = dir.path().join("bad.mp3");
        fs::write(&ok_audio, b"x").unwrap();
        fs::write(&bad_audio, b"y").unwrap();

        fs::write(
            sidecar_path_for(&ok_audio),
            r#"{"Date":"2023-06-21","Title":"T","Artist":"A","CoverArtist":"Neuro","Version":3,"Discnumber":1,"Track":"1/2","Special":"1"}"#,
        )
        .unwrap();
        fs::write(
            sidecar_path_for(&bad_audio),
            r#"{"Date":"2023-06-21","Title":"T","Artist":"A","CoverArtist":"Neuro","Version":1,"Discnumber":1,"Track":"1/2","Special":"1"}"#,
        )
        .unwrap();

        let jobs = vec![
            (ok_audio.clone(), sidecar_path_for(&ok_audio)),
            (bad_audio.clone(), sidecar_path_for(&bad_audio)),
            (dir.path().join("lonely.mp3"), dir.path().join("lonely.json")),
        ];
        let report = p.engrave_all(&jobs, false);

        assert_eq!(report.files[0].outcome, Outcome::Engraved);
        assert!(matches!(report.files[1].outcome, Outcome::Invalid(_)));
        assert!(matches!(report.files[2].outcome, Outcome::Failed(_)));
        assert_eq!(p.read_record(&ok_audio).unwrap().unwrap().version, "3");
        assert_eq!(p.read_record(&bad_audio).unwrap(), None);
    }
}
