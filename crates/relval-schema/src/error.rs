//! # Error Types
//!
//! A single error enum for schema loading, input reading, and record
//! validation. Every variant that touches the filesystem names the path.

use thiserror::Error;

use crate::validate::ValidationViolations;

/// Error raised while compiling a schema, reading records, or validating one.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema file could not be read or is not JSON.
    #[error("schema load error for '{path}': {reason}")]
    SchemaLoad {
        /// Path to the schema file.
        path: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// The schema parsed but could not be compiled into a validator.
    #[error("validator build error for schema '{schema}': {reason}")]
    ValidatorBuild {
        /// Schema path or label.
        schema: String,
        /// Reason reported by the compiler.
        reason: String,
    },

    /// The input file could not be read.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the input file.
        path: String,
        /// Reason the input could not be read.
        reason: String,
    },

    /// The input file is neither `.json` nor `.jsonl`.
    #[error("unsupported file extension for '{path}'; supported extensions: .json, .jsonl")]
    UnsupportedExtension {
        /// Path to the input file.
        path: String,
    },

    /// A record is not well-formed JSON.
    #[error("failed to decode document into a generic JSON value: {0}")]
    Decode(#[from] serde_json::Error),

    /// A record decoded but does not conform to the schema.
    #[error("validation failed against schema '{schema}':\n{violations}")]
    ValidationFailed {
        /// Schema path or label.
        schema: String,
        /// Every violation found in the record.
        violations: ValidationViolations,
    },
}

impl SchemaError {
    /// True for errors that describe the record itself rather than the
    /// environment: decode failures and schema violations.
    pub fn is_record_failure(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::ValidationFailed { .. })
    }
}
