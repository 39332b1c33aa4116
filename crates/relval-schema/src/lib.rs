//! # relval-schema: Schema Compilation & Record Validation
//!
//! Compiles a user-supplied JSON Schema and validates JSON documents against
//! it, one record at a time.
//!
//! ## Records
//!
//! The [`records`] module splits an input file into raw records by its
//! extension: a `.json` file is a single record, a `.jsonl` file holds one
//! record per line. Records are kept as bytes; decoding happens at
//! validation time so a malformed line is reported against its own number.
//!
//! ## Validation
//!
//! The [`validate`] module wraps a compiled `jsonschema` validator.
//! `$ref`s resolve against the schema file's directory and are never
//! fetched over the network.
//!
//! ## Crate Policy
//!
//! - No I/O beyond reading the schema, referenced schemas, and the input.
//! - Errors carry the offending path and the underlying reason.

pub mod error;
pub mod records;
pub mod validate;

pub use error::SchemaError;
pub use records::{has_suffix, read_records, InputFormat, Record};
pub use validate::{RecordValidator, SchemaDraft, ValidationViolations, Violation};
