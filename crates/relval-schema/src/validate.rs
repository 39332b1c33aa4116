//! # Schema Validation
//!
//! Compiles a JSON Schema into a [`RecordValidator`] and validates records
//! against it.
//!
//! ## Draft Selection
//!
//! Unless a [`SchemaDraft`] is pinned, the draft is detected from the
//! schema's `$schema` keyword, falling back to the `jsonschema` crate's
//! default.
//!
//! ## Schema Resolution
//!
//! A schema without an identifier is rooted at the `file://` URL of its
//! directory before compilation, so `$ref`s such as `defs/version.json` or
//! `../common/semver.json` resolve against the schema file's location the
//! usual URI way. The retriever turns `file://` URLs back into paths,
//! percent-decoding them. Every other scheme is refused: no network requests
//! are made.

use std::fmt;
use std::path::{Path, PathBuf};

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use url::Url;

use crate::error::SchemaError;

/// Resolves `file://` `$ref` URIs to schema files on the local filesystem.
struct LocalSchemaRetriever;

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let url = Url::parse(uri.as_str())?;
        if url.scheme() != "file" {
            return Err(format!("refusing to retrieve non-local schema '{url}'").into());
        }
        let path = url
            .to_file_path()
            .map_err(|()| format!("'{url}' does not name a local file"))?;

        tracing::trace!(uri = %url, path = %path.display(), "retrieving referenced schema");

        let content = std::fs::read_to_string(&path).map_err(|e| {
            format!("cannot read referenced schema '{}': {e}", path.display())
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Give `schema` a `file://` identifier for `base_dir` unless it already
/// carries one. Draft 4 spells the keyword `id`.
fn root_at_directory(
    schema: &Value,
    base_dir: &Path,
    draft: Option<SchemaDraft>,
) -> Result<Value, String> {
    let mut schema = schema.clone();
    if !schema.is_object() {
        return Ok(schema);
    }

    let is_draft4 = match draft {
        Some(draft) => draft == SchemaDraft::Draft4,
        None => schema
            .get("$schema")
            .and_then(Value::as_str)
            .is_some_and(|uri| uri.contains("draft-04")),
    };
    let keyword = if is_draft4 { "id" } else { "$id" };
    if schema.get(keyword).is_some() {
        return Ok(schema);
    }

    let dir = std::fs::canonicalize(base_dir)
        .map_err(|e| format!("cannot resolve schema directory '{}': {e}", base_dir.display()))?;
    let base = Url::from_directory_path(&dir)
        .map_err(|()| format!("'{}' cannot be expressed as a file URL", dir.display()))?;
    if let Some(object) = schema.as_object_mut() {
        object.insert(keyword.to_string(), Value::String(base.to_string()));
    }
    Ok(schema)
}

/// JSON Schema draft to pin instead of detecting it from `$schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaDraft {
    Draft4,
    Draft6,
    Draft7,
    Draft201909,
    Draft202012,
}

impl From<SchemaDraft> for jsonschema::Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft4 => jsonschema::Draft::Draft4,
            SchemaDraft::Draft6 => jsonschema::Draft::Draft6,
            SchemaDraft::Draft7 => jsonschema::Draft::Draft7,
            SchemaDraft::Draft201909 => jsonschema::Draft::Draft201909,
            SchemaDraft::Draft202012 => jsonschema::Draft::Draft202012,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Every violation found in one record. Never empty.
#[derive(Debug, Clone)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// A compiled schema, ready to validate records.
///
/// Compilation happens once; the validator is then reused for every record
/// of the input.
pub struct RecordValidator {
    /// Schema path (or caller-supplied label) used in error messages.
    schema: String,
    validator: Validator,
}

impl fmt::Debug for RecordValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl RecordValidator {
    /// Load and compile the schema at `path`.
    ///
    /// Relative `$ref`s resolve against the directory containing `path`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::SchemaLoad` if the file cannot be read or is not
    /// JSON, and `SchemaError::ValidatorBuild` if compilation fails.
    pub fn from_file(
        path: impl AsRef<Path>,
        draft: Option<SchemaDraft>,
    ) -> Result<Self, SchemaError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::SchemaLoad {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;

        let schema: Value =
            serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoad {
                path: path.display().to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;

        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self::from_value(&path.display().to_string(), &schema, &base_dir, draft)
    }

    /// Compile an already-parsed schema.
    ///
    /// `label` names the schema in error messages; `base_dir` is where
    /// relative `$ref`s are looked up.
    pub fn from_value(
        label: &str,
        schema: &Value,
        base_dir: &Path,
        draft: Option<SchemaDraft>,
    ) -> Result<Self, SchemaError> {
        let schema =
            root_at_directory(schema, base_dir, draft).map_err(|reason| {
                SchemaError::ValidatorBuild {
                    schema: label.to_string(),
                    reason,
                }
            })?;

        let mut opts = jsonschema::options();
        if let Some(draft) = draft {
            opts.with_draft(draft.into());
        }
        opts.with_retriever(LocalSchemaRetriever);

        let validator = opts
            .build(&schema)
            .map_err(|e| SchemaError::ValidatorBuild {
                schema: label.to_string(),
                reason: e.to_string(),
            })?;

        tracing::debug!(schema = label, draft = ?draft, "compiled schema");

        Ok(Self {
            schema: label.to_string(),
            validator,
        })
    }

    /// The schema path or label this validator was built from.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Validate a decoded document.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` listing every violation.
    pub fn validate_value(&self, instance: &Value) -> Result<(), SchemaError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                schema: self.schema.clone(),
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Decode raw bytes into a generic JSON value and validate it.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::Decode` if the bytes are not a JSON document, or
    /// `SchemaError::ValidationFailed` if the document breaks the schema.
    pub fn validate_bytes(&self, bytes: &[u8]) -> Result<(), SchemaError> {
        let instance: Value = serde_json::from_slice(bytes)?;
        self.validate_value(&instance)
    }
}
