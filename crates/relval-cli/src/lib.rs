//! # relval-cli: Release Document Validator
//!
//! Provides the `relval` command: validate a `.json` document, or each line
//! of a `.jsonl` file, against a JSON Schema.
//!
//! ```bash
//! relval --in release.json --schema release.schema.json
//! relval --in releases.jsonl --schema release.schema.json --draft 4
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives here; schema work is delegated to
//!   `relval-schema`.
//! - Result lines go to stdout, logs to stderr.

pub mod check;

/// Version reported by `--version`. Set `RELVAL_VERSION` at build time to
/// stamp a release.
pub const VERSION: &str = match option_env!("RELVAL_VERSION") {
    Some(v) => v,
    None => "unreleased",
};
