//! core/mod.rs
//!
//! The brain of the tool:
//! - Validate raw fields and encode them into the embedded payload
//! - Decode payloads and expand patterns into display tags + filenames
//! - Read/write ID3 frames (behind the `TagStore` trait)
//!
//! Pure parts (no IO): `validate`, `payload`, `template`, `sanitize`, `types`.
//! IO parts: `tags`, `hash`, `library`, `rename`, `sidecar`, `config`.
//! `pipeline` wires them together per file.

pub mod config;
pub mod error;
pub mod hash;
pub mod library;
pub mod payload;
pub mod pipeline;
pub mod rename;
pub mod sanitize;
pub mod sidecar;
pub mod tags;
pub mod template;
pub mod types;
pub mod validate;

pub use config::Config;
pub use error::{Error, PayloadError, RenameError, Result, ValidationError, ValidationErrorKind};
pub use pipeline::{BatchReport, Outcome, Pipeline, RenderOptions};
pub use tags::{Id3Store, TagStore};
pub use types::{FieldId, Record, Rendered};
