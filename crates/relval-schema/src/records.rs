//! # Record Reading
//!
//! Splits an input file into raw JSON records according to its extension.
//!
//! - `.json`: the whole file is one record.
//! - `.jsonl`: one record per line. `\n` and `\r\n` terminators are
//!   stripped and a final terminator does not open an empty record.
//!   Blank lines in the middle of the file are kept: they are records that
//!   fail to decode, and processing stops there.

use std::fmt;
use std::path::Path;

use crate::error::SchemaError;

/// Input layout, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// A single JSON document (`.json`).
    Json,
    /// Newline-delimited JSON documents (`.jsonl`).
    JsonLines,
}

impl InputFormat {
    /// Detect the format from the suffix of the file name of `path`.
    ///
    /// Matching is case-sensitive: `release.JSON` is not accepted. A file
    /// named just `.json` is.
    pub fn from_path(path: &Path) -> Option<Self> {
        if has_suffix(path, ".jsonl") {
            Some(Self::JsonLines)
        } else if has_suffix(path, ".json") {
            Some(Self::Json)
        } else {
            None
        }
    }

    /// The file extension for this format, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonLines => "jsonl",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension())
    }
}

/// True if the file name of `path` ends with `suffix`.
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

/// One raw JSON document taken from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based position of the record in the input.
    pub number: usize,
    /// Undecoded bytes of the record, without line terminator.
    pub bytes: Vec<u8>,
}

/// Read `path` and split it into records.
///
/// # Errors
///
/// Returns `SchemaError::UnsupportedExtension` if the extension is neither
/// `.json` nor `.jsonl`, and `SchemaError::DocumentLoad` if the file cannot
/// be read.
pub fn read_records(path: &Path) -> Result<Vec<Record>, SchemaError> {
    let format =
        InputFormat::from_path(path).ok_or_else(|| SchemaError::UnsupportedExtension {
            path: path.display().to_string(),
        })?;

    let content = std::fs::read(path).map_err(|e| SchemaError::DocumentLoad {
        path: path.display().to_string(),
        reason: format!("cannot read file: {e}"),
    })?;

    let records = match format {
        InputFormat::Json => vec![Record {
            number: 1,
            bytes: content,
        }],
        InputFormat::JsonLines => split_lines(&content)
            .into_iter()
            .enumerate()
            .map(|(i, line)| Record {
                number: i + 1,
                bytes: line.to_vec(),
            })
            .collect(),
    };

    tracing::debug!(
        path = %path.display(),
        format = %format,
        records = records.len(),
        "read input records"
    );

    Ok(records)
}

fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    let mut lines: Vec<&[u8]> = content.split(|&b| b == b'\n').collect();
    // `split` yields one trailing empty slice after a final terminator (or
    // for empty input); that slice is not a record.
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|l| l.strip_suffix(b"\r").unwrap_or(l))
        .collect()
}
