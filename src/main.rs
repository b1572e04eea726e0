//! vedtag CLI
//!
//! # What this program does
//! Keeps a small provenance record inside every cover-song MP3 and derives
//! the visible tags + filename from it.
//!
//! - `check`   validate sidecar field files without touching audio
//! - `engrave` validate + embed a record (from a JSON sidecar) into an MP3
//! - `render`  read embedded records and rewrite display tags / filenames
//! - `show`    print what a file carries and what it would render to
//! - `hash`    print the content fingerprint of MP3s
//!
//! Batch commands never stop on a bad file: it is reported and skipped.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vedtag::core::hash::content_hash;
use vedtag::core::library::scan_paths;
use vedtag::core::pipeline::{BatchReport, Outcome, RenderOptions, sidecar_path_for};
use vedtag::core::tags::read_embedded_art;
use vedtag::core::types::Artwork;
use vedtag::core::{Config, Id3Store, Pipeline, payload, sidecar};

#[derive(Parser, Debug)]
#[command(name = "vedtag")]
#[command(about = "Embed and render provenance payloads in cover-song MP3s")]
#[command(version)]
struct Args {
    /// TOML configuration (patterns, validation rules, album artist)
    #[arg(short, long, global = true, env = "VEDTAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate sidecar field files and print their payloads
    Check {
        #[arg(required = true)]
        sidecars: Vec<PathBuf>,
    },

    /// Embed a record into each MP3 (fields from `<name>.hjson` or `<name>.json` next to it)
    Engrave {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Sidecar to use instead of the one next to the file (single file only)
        #[arg(short, long)]
        fields: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Rewrite display tags from embedded records
    Render {
        /// Files or folders (searched recursively for .mp3)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Also rename files to the rendered filename
        #[arg(short, long)]
        rename: bool,

        /// Front cover to embed (JPEG or PNG)
        #[arg(short, long)]
        artwork: Option<PathBuf>,

        #[arg(long)]
        dry_run: bool,
    },

    /// Print the embedded record and its rendering
    Show { file: PathBuf },

    /// Print content hashes
    Hash {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let default_filter = if args.verbose { "vedtag=debug" } else { "vedtag=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let pipeline = Pipeline::new(Id3Store::default(), config);

    match args.command {
        Command::Check { sidecars } => check(&pipeline, &sidecars),
        Command::Engrave {
            files,
            fields,
            dry_run,
        } => engrave(&pipeline, files, fields, dry_run),
        Command::Render {
            paths,
            rename,
            artwork,
            dry_run,
        } => render(&pipeline, &paths, rename, artwork.as_deref(), dry_run),
        Command::Show { file } => show(&pipeline, &file),
        Command::Hash { files } => {
            for file in &files {
                let hash = content_hash(file)
                    .with_context(|| format!("Failed to hash {}", file.display()))?;
                println!("{hash}  {}", file.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check(pipeline: &Pipeline<Id3Store>, sidecars: &[PathBuf]) -> Result<ExitCode> {
    let mut failures = 0usize;

    for path in sidecars {
        let result = sidecar::load(path).and_then(|record| pipeline.build_payload(&record));
        match result {
            Ok(text) => println!("ok    {}\n      {text}", path.display()),
            Err(e) => {
                failures += 1;
                println!("FAIL  {}: {e}", path.display());
            }
        }
    }

    Ok(exit_code(failures == 0))
}

fn engrave(
    pipeline: &Pipeline<Id3Store>,
    files: Vec<PathBuf>,
    fields: Option<PathBuf>,
    dry_run: bool,
) -> Result<ExitCode> {
    let jobs: Vec<(PathBuf, PathBuf)> = match fields {
        Some(fields) => {
            if files.len() != 1 {
                bail!("--fields can only be used with a single file");
            }
            files.into_iter().map(|f| (f, fields.clone())).collect()
        }
        None => files
            .into_iter()
            .map(|f| {
                let sidecar = sidecar_path_for(&f);
                (f, sidecar)
            })
            .collect(),
    };

    let report = pipeline.engrave_all(&jobs, dry_run);
    print_report(&report);
    Ok(exit_code(report.skipped() == 0))
}

fn render(
    pipeline: &Pipeline<Id3Store>,
    roots: &[PathBuf],
    rename: bool,
    artwork: Option<&Path>,
    dry_run: bool,
) -> Result<ExitCode> {
    let artwork = artwork.map(load_artwork).transpose()?;
    let paths = scan_paths(roots).context("Failed to scan for MP3 files")?;
    info!("Processing {} files...", paths.len());

    let opts = RenderOptions {
        rename,
        dry_run,
        artwork,
    };
    let report = pipeline.render_all(&paths, &opts);
    print_report(&report);

    // Files without a payload are expected in mixed folders; only real problems fail.
    let problems = report.count(|o| !o.is_success() && *o != Outcome::NoPayload);
    Ok(exit_code(problems == 0))
}

fn show(pipeline: &Pipeline<Id3Store>, file: &Path) -> Result<ExitCode> {
    let Some(record) = pipeline
        .read_record(file)
        .with_context(|| format!("Failed to read payload of {}", file.display()))?
    else {
        println!("{}: no payload", file.display());
        return Ok(ExitCode::FAILURE);
    };

    println!("{}", file.display());
    println!("  payload   {}", payload::encode(&record).unwrap_or_else(|e| e.to_string()));

    let rendered = pipeline.render(&record);
    println!("  title     {}", rendered.title);
    println!("  artist    {}", rendered.artist);
    println!("  album     {}", rendered.album);
    println!("  track     {}", rendered.track);
    println!("  comment   {}", rendered.comment);
    println!("  filename  {}.mp3", rendered.filename);

    let current = pipeline.store().read_presentation(file)?.unwrap_or_default();
    let expected = pipeline.presentation(&record, &rendered);
    println!("  tags      {}", if current == expected { "up to date" } else { "stale" });

    match read_embedded_art(file)? {
        Some((data, mime)) => println!("  artwork   {mime}, {} bytes", data.len()),
        None => println!("  artwork   none"),
    }

    Ok(ExitCode::SUCCESS)
}

fn load_artwork(path: &Path) -> Result<Artwork> {
    let kind = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let artwork = Artwork {
        kind,
        data: std::fs::read(path)
            .with_context(|| format!("Failed to read artwork {}", path.display()))?,
    };
    if artwork.mime_type().is_none() {
        bail!("artwork must be a .jpg, .jpeg or .png file: {}", path.display());
    }
    Ok(artwork)
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        let path = file.path.display();
        match &file.outcome {
            Outcome::Engraved => println!("engraved   {path}"),
            Outcome::Rendered { renamed_to: None } => println!("rendered   {path}"),
            Outcome::Rendered { renamed_to: Some(to) } => {
                println!("renamed    [{path}] -> [{}]", to.display())
            }
            Outcome::NoPayload => println!("no payload {path}"),
            Outcome::Malformed(reason) => println!("malformed  {path}: {reason}"),
            Outcome::Invalid(reason) => println!("invalid    {path}: {reason}"),
            Outcome::Incomplete(field) => println!("incomplete {path}: missing {field}"),
            Outcome::Collision(target) => {
                println!("collision  {path}: {} already exists", target.display())
            }
            Outcome::Failed(reason) => println!("failed     {path}: {reason}"),
        }
    }
    println!(
        "{} processed, {} ok, {} skipped",
        report.files.len(),
        report.succeeded(),
        report.skipped()
    );
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
