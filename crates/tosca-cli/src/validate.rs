//! # Validate Subcommand
//!
//! Loads every given document into one catalog, then validates each custom
//! group type: its section schema, its metadata, and its `derived_from`
//! chain. All diagnostics are collected before anything is printed.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;
use tosca_core::{Diagnostics, ErrorKind, ErrorSink, SharedSink, TypeCatalog};
use tosca_types::GroupType;

use crate::{load_catalog, GROUP_TYPES};

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Definition documents. All of them form one catalog.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Number of worker threads.
    #[arg(long, short = 'j', default_value_t = 1)]
    pub jobs: usize,

    /// Resolve against the given documents only.
    #[arg(long)]
    pub no_builtins: bool,
}

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Execute the validate subcommand.
///
/// Returns 0 when no diagnostics were recorded and 1 otherwise.
pub fn run_validate(args: &ValidateArgs, config: Option<&Path>) -> Result<u8> {
    let catalog = load_catalog(&args.files, args.no_builtins, config)?;
    let names = catalog.names_in(GROUP_TYPES);
    let diagnostics = validate_catalog(&catalog, args.jobs);

    tracing::info!(
        types = names.len(),
        diagnostics = diagnostics.len(),
        "validation finished"
    );

    let report = Report::new(names.len(), &diagnostics);
    println!("{}", report.render(args.format)?);
    Ok(if diagnostics.is_empty() { 0 } else { 1 })
}

/// Validate every custom group type in `catalog` on `jobs` threads.
///
/// The result is sorted, so it does not depend on scheduling.
pub fn validate_catalog(catalog: &TypeCatalog, jobs: usize) -> Diagnostics {
    let names = catalog.names_in(GROUP_TYPES);
    let mut diagnostics = if jobs <= 1 || names.len() <= 1 {
        let mut sink = Diagnostics::new();
        for name in &names {
            validate_one(name, catalog, &mut sink);
        }
        sink
    } else {
        let shared = SharedSink::new();
        let chunk = names.len().div_ceil(jobs);
        std::thread::scope(|scope| {
            for batch in names.chunks(chunk) {
                let mut sink = shared.clone();
                scope.spawn(move || {
                    for name in batch {
                        validate_one(name, catalog, &mut sink);
                    }
                });
            }
        });
        shared.drain()
    };
    diagnostics.sort();
    diagnostics
}

fn validate_one(name: &str, catalog: &TypeCatalog, sink: &mut dyn ErrorSink) {
    tracing::debug!(type_name = name, "validating group type");
    // Names come from the custom layer; check that definition even when a
    // built-in of the same name shadows it.
    let group = match catalog.custom(name) {
        Some(definition) => GroupType::with_definition(name, Some(definition), catalog, sink),
        None => GroupType::new(name, catalog, sink),
    };
    group.ancestors(sink);
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    types_checked: usize,
    diagnostic_count: usize,
    diagnostics: Vec<Entry<'a>>,
}

#[derive(Debug, Serialize)]
struct Entry<'a> {
    kind: ErrorKind,
    context: &'a str,
    subject: String,
    message: String,
}

impl<'a> Report<'a> {
    fn new(types_checked: usize, diagnostics: &'a Diagnostics) -> Self {
        Self {
            types_checked,
            diagnostic_count: diagnostics.len(),
            diagnostics: diagnostics
                .iter()
                .map(|e| Entry {
                    kind: e.kind(),
                    context: e.context(),
                    subject: e.subject(),
                    message: e.to_string(),
                })
                .collect(),
        }
    }

    fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Text => {
                let mut out = String::new();
                for entry in &self.diagnostics {
                    out.push_str(&format!("  {}: {}\n", entry.kind, entry.message));
                }
                out.push_str(&format!(
                    "{} group type(s) checked, {} diagnostic(s)",
                    self.types_checked, self.diagnostic_count
                ));
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITIONS: &str = r#"
group_types:
  g.Clean:
    derived_from: tosca.groups.Root
    metadata:
      type: map
      owner:
        type: string
  g.Bogus:
    bogus_field: 1
  g.BadMeta:
    metadata:
      type: list
  g.A:
    derived_from: g.B
  g.B:
    derived_from: g.A
  g.Orphan:
    derived_from: g.Missing
"#;

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new().unwrap();
        catalog.extend_from_yaml_str(DEFINITIONS, "defs.yaml").unwrap();
        catalog
    }

    #[test]
    fn test_every_violation_is_reported() {
        let diags = validate_catalog(&catalog(), 1);
        assert_eq!(diags.count(ErrorKind::UnknownField), 1);
        // Bad metadata plus the undefined parent.
        assert_eq!(diags.count(ErrorKind::InvalidType), 2);
        // One per member of the cycle.
        assert_eq!(diags.count(ErrorKind::DerivationCycle), 2);
        assert_eq!(diags.len(), 5);
    }

    #[test]
    fn test_parallel_run_matches_sequential_run() {
        let catalog = catalog();
        let sequential = validate_catalog(&catalog, 1);
        for jobs in [2, 3, 8, 64] {
            assert_eq!(validate_catalog(&catalog, jobs), sequential, "jobs = {jobs}");
        }
    }

    #[test]
    fn test_clean_catalog_has_no_diagnostics() {
        let mut catalog = TypeCatalog::new().unwrap();
        catalog
            .extend_from_yaml_str("group_types:\n  g.Clean:\n    description: ok\n", "ok.yaml")
            .unwrap();
        assert!(validate_catalog(&catalog, 4).is_empty());
    }

    #[test]
    fn test_custom_definition_shadowing_a_builtin_is_validated() {
        let mut catalog = TypeCatalog::new().unwrap();
        catalog
            .extend_from_yaml_str(
                "group_types:\n  tosca.groups.Root:\n    placement: rack\n",
                "shadow.yaml",
            )
            .unwrap();
        let diags = validate_catalog(&catalog, 1);
        assert_eq!(diags.len(), 1);
        assert_eq!(diags.errors()[0].subject(), "placement");
        assert!(diags.errors()[0].context().contains("tosca.groups.Root"));
    }

    #[test]
    fn test_text_report_ends_with_summary() {
        let diags = validate_catalog(&catalog(), 1);
        let text = Report::new(6, &diags).render(OutputFormat::Text).unwrap();
        assert!(text.contains("UnknownFieldError: Group Type g.Bogus contains unknown field \"bogus_field\""));
        assert!(text.ends_with("6 group type(s) checked, 5 diagnostic(s)"));
    }

    #[test]
    fn test_json_report_is_structured() {
        let diags = validate_catalog(&catalog(), 1);
        let json = Report::new(6, &diags).render(OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["types_checked"], 6);
        assert_eq!(parsed["diagnostic_count"], 5);
        let kinds: Vec<&str> = parsed["diagnostics"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["kind"].as_str().unwrap())
            .collect();
        assert!(kinds.contains(&"UnknownFieldError"));
        assert!(kinds.contains(&"DerivationCycleError"));
    }

    #[test]
    fn test_run_validate_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let clean = dir.path().join("clean.yaml");
        std::fs::write(&clean, "group_types:\n  g.Clean: {}\n").unwrap();
        let dirty = dir.path().join("dirty.yaml");
        std::fs::write(&dirty, "group_types:\n  g.Dirty:\n    bogus: 1\n").unwrap();

        let args = |files: Vec<PathBuf>| ValidateArgs {
            files,
            format: OutputFormat::Text,
            jobs: 1,
            no_builtins: false,
        };
        assert_eq!(run_validate(&args(vec![clean.clone()]), None).unwrap(), 0);
        assert_eq!(run_validate(&args(vec![clean, dirty]), None).unwrap(), 1);
        assert!(run_validate(&args(vec![dir.path().join("missing.yaml")]), None).is_err());
    }
}
