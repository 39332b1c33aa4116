//! # Check Command
//!
//! Pre-flight checks on the `--in` and `--schema` paths, then the record
//! loop: compile the schema, read the records, validate them in order,
//! print `N valid` per record and stop at the first failure.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use relval_schema::{
    has_suffix, read_records, InputFormat, RecordValidator, SchemaDraft, SchemaError,
};

/// Every record passed.
pub const EXIT_OK: u8 = 0;
/// A record failed decoding or schema validation.
pub const EXIT_INVALID: u8 = 1;
/// Usage or operational error; no verdict was reached.
pub const EXIT_ERROR: u8 = 2;

/// JSON Schema draft accepted by `--draft`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DraftArg {
    #[value(name = "4")]
    Draft4,
    #[value(name = "6")]
    Draft6,
    #[value(name = "7")]
    Draft7,
    #[value(name = "2019-09")]
    Draft201909,
    #[value(name = "2020-12")]
    Draft202012,
}

impl From<DraftArg> for SchemaDraft {
    fn from(arg: DraftArg) -> Self {
        match arg {
            DraftArg::Draft4 => SchemaDraft::Draft4,
            DraftArg::Draft6 => SchemaDraft::Draft6,
            DraftArg::Draft7 => SchemaDraft::Draft7,
            DraftArg::Draft201909 => SchemaDraft::Draft201909,
            DraftArg::Draft202012 => SchemaDraft::Draft202012,
        }
    }
}

/// Arguments for a validation run.
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Path to the release.json file (.json, or .jsonl for one document per line).
    #[arg(long = "in", value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Path to the release.json schema file (.json).
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// Pin the JSON Schema draft instead of detecting it from `$schema`.
    #[arg(long, value_enum, value_name = "DRAFT")]
    pub draft: Option<DraftArg>,
}

/// Paths that passed pre-flight checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckPlan {
    pub input: PathBuf,
    pub format: InputFormat,
    pub schema: PathBuf,
}

/// Check that both paths are given, carry a supported extension, and exist.
///
/// The input is checked before the schema; the first problem found is
/// reported.
pub fn preflight(args: &CheckArgs) -> Result<CheckPlan> {
    let Some(input) = non_empty(args.input.as_deref()) else {
        bail!("--in is required");
    };
    let Some(format) = InputFormat::from_path(input) else {
        bail!("input file has unsupported file extension. supported extensions: .json, .jsonl");
    };
    if !input.exists() {
        bail!("input file does not exist: {}", input.display());
    }

    let Some(schema) = non_empty(args.schema.as_deref()) else {
        bail!("--schema is required");
    };
    if !has_suffix(schema, ".json") {
        bail!("schema file has unsupported file extension. supported extensions: .json");
    }
    if !schema.exists() {
        bail!("schema file does not exist: {}", schema.display());
    }

    Ok(CheckPlan {
        input: input.to_path_buf(),
        format,
        schema: schema.to_path_buf(),
    })
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Execute a validation run, writing one result line per record to `out`.
///
/// Returns [`EXIT_OK`] when every record is valid and [`EXIT_INVALID`] when
/// a record fails. Errors are usage or operational failures.
pub fn run_check<W: Write>(args: &CheckArgs, out: &mut W) -> Result<u8> {
    let plan = preflight(args)?;

    let validator = RecordValidator::from_file(&plan.schema, args.draft.map(Into::into))
        .context("failed to configure the schema validator")?;

    let records = read_records(&plan.input).context("failed to read input file")?;

    tracing::info!(
        input = %plan.input.display(),
        schema = validator.schema(),
        format = %plan.format,
        records = records.len(),
        "validating records"
    );

    for record in &records {
        match validator.validate_bytes(&record.bytes) {
            Ok(()) => writeln!(out, "{} valid", record.number)?,
            Err(e) if e.is_record_failure() => {
                if let SchemaError::ValidationFailed { violations, .. } = &e {
                    for v in violations.violations() {
                        tracing::debug!(
                            record = record.number,
                            instance_path = %v.instance_path,
                            schema_path = %v.schema_path,
                            "schema violation"
                        );
                    }
                }
                writeln!(out, "{} invalid: {e}", record.number)?;
                return Ok(EXIT_INVALID);
            }
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("failed to validate record {}", record.number)));
            }
        }
    }

    Ok(EXIT_OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "name": { "type": "string" },
            "version": { "type": "string", "pattern": "^[0-9]+\\.[0-9]+\\.[0-9]+$" }
        },
        "required": ["name", "version"]
    }"#;

    struct Workspace {
        dir: tempfile::TempDir,
    }

    impl Workspace {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("schema.json"), SCHEMA).unwrap();
            Self { dir }
        }

        fn file(&self, name: &str, content: &str) -> PathBuf {
            let path = self.dir.path().join(name);
            std::fs::write(&path, content).unwrap();
            path
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn args(&self, input: &str) -> CheckArgs {
            CheckArgs {
                input: Some(self.path(input)),
                schema: Some(self.path("schema.json")),
                draft: None,
            }
        }
    }

    fn run(args: &CheckArgs) -> (Result<u8>, String) {
        let mut out = Vec::new();
        let result = run_check(args, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn json_document_valid() {
        let ws = Workspace::new();
        ws.file("release.json", r#"{"name":"relval","version":"1.0.0"}"#);
        let (result, out) = run(&ws.args("release.json"));
        assert_eq!(result.unwrap(), EXIT_OK);
        assert_eq!(out, "1 valid\n");
    }

    #[test]
    fn jsonl_every_line_reported() {
        let ws = Workspace::new();
        ws.file(
            "releases.jsonl",
            "{\"name\":\"a\",\"version\":\"0.1.0\"}\n{\"name\":\"b\",\"version\":\"0.2.0\"}\n{\"name\":\"c\",\"version\":\"0.3.0\"}\n",
        );
        let (result, out) = run(&ws.args("releases.jsonl"));
        assert_eq!(result.unwrap(), EXIT_OK);
        assert_eq!(out, "1 valid\n2 valid\n3 valid\n");
    }

    #[test]
    fn jsonl_stops_at_first_failure() {
        let ws = Workspace::new();
        ws.file(
            "releases.jsonl",
            "{\"name\":\"a\",\"version\":\"0.1.0\"}\n{\"name\":\"b\",\"version\":\"two\"}\n{\"name\":\"c\",\"version\":\"0.3.0\"}\n",
        );
        let (result, out) = run(&ws.args("releases.jsonl"));
        assert_eq!(result.unwrap(), EXIT_INVALID);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3, "got: {out}");
        assert_eq!(lines[0], "1 valid");
        assert_eq!(
            lines[1],
            format!(
                "2 invalid: validation failed against schema '{}':",
                ws.path("schema.json").display()
            )
        );
        assert!(
            lines[2].starts_with("  /version: \"two\" does not match"),
            "got: {}",
            lines[2]
        );
        assert!(!out.contains("3 valid"));
    }

    #[test]
    fn missing_field_reported_at_root() {
        let ws = Workspace::new();
        ws.file("release.json", r#"{"name":"relval"}"#);
        let (result, out) = run(&ws.args("release.json"));
        assert_eq!(result.unwrap(), EXIT_INVALID);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2, "got: {out}");
        assert_eq!(lines[1], "  (root): \"version\" is a required property");
    }

    #[test]
    fn malformed_json_is_invalid_record() {
        let ws = Workspace::new();
        ws.file("release.json", "{\"name\": \"relval\",");
        let (result, out) = run(&ws.args("release.json"));
        assert_eq!(result.unwrap(), EXIT_INVALID);
        assert!(out.starts_with("1 invalid: failed to decode"), "got: {out}");
    }

    #[test]
    fn empty_jsonl_prints_nothing() {
        let ws = Workspace::new();
        ws.file("releases.jsonl", "");
        let (result, out) = run(&ws.args("releases.jsonl"));
        assert_eq!(result.unwrap(), EXIT_OK);
        assert!(out.is_empty());
    }

    #[test]
    fn missing_input_flag() {
        let ws = Workspace::new();
        let args = CheckArgs {
            input: None,
            schema: Some(ws.path("schema.json")),
            draft: None,
        };
        let err = preflight(&args).unwrap_err();
        assert_eq!(err.to_string(), "--in is required");
    }

    #[test]
    fn empty_input_flag_treated_as_missing() {
        let args = CheckArgs {
            input: Some(PathBuf::new()),
            ..Default::default()
        };
        let err = preflight(&args).unwrap_err();
        assert_eq!(err.to_string(), "--in is required");
    }

    #[test]
    fn input_checked_before_schema() {
        let err = preflight(&CheckArgs::default()).unwrap_err();
        assert_eq!(err.to_string(), "--in is required");
    }

    #[test]
    fn unsupported_input_extension() {
        let ws = Workspace::new();
        ws.file("release.yaml", "name: relval");
        let err = preflight(&ws.args("release.yaml")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "input file has unsupported file extension. supported extensions: .json, .jsonl"
        );
    }

    #[test]
    fn input_does_not_exist() {
        let ws = Workspace::new();
        let err = preflight(&ws.args("absent.json")).unwrap_err();
        assert!(err.to_string().starts_with("input file does not exist: "));
    }

    #[test]
    fn missing_schema_flag() {
        let ws = Workspace::new();
        ws.file("release.json", "{}");
        let args = CheckArgs {
            input: Some(ws.path("release.json")),
            schema: None,
            draft: None,
        };
        let err = preflight(&args).unwrap_err();
        assert_eq!(err.to_string(), "--schema is required");
    }

    #[test]
    fn unsupported_schema_extension() {
        let ws = Workspace::new();
        ws.file("release.json", "{}");
        let schema = ws.file("schema.jsonl", SCHEMA);
        let args = CheckArgs {
            input: Some(ws.path("release.json")),
            schema: Some(schema),
            draft: None,
        };
        let err = preflight(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema file has unsupported file extension. supported extensions: .json"
        );
    }

    #[test]
    fn schema_does_not_exist() {
        let ws = Workspace::new();
        ws.file("release.json", "{}");
        let args = CheckArgs {
            input: Some(ws.path("release.json")),
            schema: Some(ws.path("other.json")),
            draft: None,
        };
        let err = preflight(&args).unwrap_err();
        assert!(err.to_string().starts_with("schema file does not exist: "));
    }

    #[test]
    fn bare_dot_json_names_accepted() {
        let ws = Workspace::new();
        ws.file(".json", "{}");
        let schema = ws.file(".json.schema", SCHEMA);
        let args = CheckArgs {
            input: Some(ws.path(".json")),
            schema: Some(schema),
            draft: None,
        };
        let err = preflight(&args).unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema file has unsupported file extension. supported extensions: .json"
        );

        let args = CheckArgs {
            input: Some(ws.path(".json")),
            schema: Some(ws.path("schema.json")),
            draft: None,
        };
        assert_eq!(preflight(&args).unwrap().format, InputFormat::Json);
    }

    #[test]
    fn preflight_reports_format() {
        let ws = Workspace::new();
        ws.file("releases.jsonl", "");
        let plan = preflight(&ws.args("releases.jsonl")).unwrap();
        assert_eq!(plan.format, InputFormat::JsonLines);
        assert_eq!(plan.schema, ws.path("schema.json"));
    }

    #[test]
    fn broken_schema_is_operational_error() {
        let ws = Workspace::new();
        ws.file("release.json", "{}");
        ws.file("schema.json", "{ not json");
        let (result, out) = run(&ws.args("release.json"));
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("invalid JSON"));
        assert!(out.is_empty());
    }

    #[test]
    fn pinned_draft_is_applied() {
        let ws = Workspace::new();
        ws.file("schema.json", r#"{ "prefixItems": [{ "type": "string" }] }"#);
        ws.file("release.json", "[1]");

        let mut args = ws.args("release.json");
        args.draft = Some(DraftArg::Draft4);
        let (result, out) = run(&args);
        assert_eq!(result.unwrap(), EXIT_OK);
        assert_eq!(out, "1 valid\n");

        args.draft = Some(DraftArg::Draft202012);
        let (result, _) = run(&args);
        assert_eq!(result.unwrap(), EXIT_INVALID);
    }
}
