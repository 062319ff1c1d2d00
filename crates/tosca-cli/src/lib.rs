//! # tosca-cli — Command-Line Driver for Type Definitions
//!
//! Provides the `tosca` command-line interface over the `tosca-types`
//! models.
//!
//! ## Subcommands
//!
//! - `tosca validate`: validate every group type in one or more
//!   definition documents and report all violations in one pass.
//! - `tosca inspect`: print the resolved view of a single group type.
//!
//! ```bash
//! tosca validate types/*.yaml
//! tosca validate --format json --jobs 4 types/*.yaml
//! tosca inspect types/groups.yaml mycompany.groups.Cluster
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers take parsed args and
//!   return an exit code.
//! - Loading failures are `anyhow` errors; schema violations are output.

pub mod inspect;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tosca_core::{CatalogConfig, TypeCatalog};

/// Section holding the group types a command operates on.
pub const GROUP_TYPES: &str = "group_types";

/// Build one catalog from `files`.
///
/// Built-in definitions are included unless `no_builtins` is set. `config`
/// names an optional YAML file with resolution settings.
pub fn load_catalog(files: &[PathBuf], no_builtins: bool, config: Option<&Path>) -> Result<TypeCatalog> {
    let config = match config {
        Some(path) => CatalogConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => CatalogConfig::default(),
    };
    let catalog = if no_builtins {
        TypeCatalog::empty()
    } else {
        TypeCatalog::new().context("failed to load built-in definitions")?
    };
    let mut catalog = catalog.with_config(config);

    for file in files {
        let count = catalog
            .load_file(file)
            .with_context(|| format!("failed to load definitions: {}", file.display()))?;
        tracing::info!(file = %file.display(), count, "loaded definitions");
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_catalog_merges_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.yaml", "group_types:\n  g.A: {}\n");
        let b = write(dir.path(), "b.yaml", "group_types:\n  g.B:\n    derived_from: g.A\n");
        let catalog = load_catalog(&[a, b], false, None).unwrap();
        assert_eq!(catalog.names_in(GROUP_TYPES), vec!["g.A", "g.B"]);
        assert!(catalog.get("tosca.groups.Root").is_some());
    }

    #[test]
    fn test_load_catalog_without_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.yaml", "group_types:\n  g.A: {}\n");
        let catalog = load_catalog(&[a], true, None).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("tosca.groups.Root").is_none());
    }

    #[test]
    fn test_load_catalog_applies_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "tosca.yaml", "max_derivation_depth: 3\n");
        let catalog = load_catalog(&[], false, Some(&config)).unwrap();
        assert_eq!(catalog.config().max_derivation_depth, 3);
        assert!(catalog.config().accept_short_capability_form);
    }

    #[test]
    fn test_load_catalog_reports_the_failing_file() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(dir.path(), "bad.yaml", "group_types: [not, a, mapping]\n");
        let err = load_catalog(&[bad], false, None).unwrap_err();
        assert!(format!("{err:#}").contains("bad.yaml"));
    }

    #[test]
    fn test_load_catalog_rejects_unknown_config_keys() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "tosca.yaml", "max_depth: 3\n");
        assert!(load_catalog(&[], false, Some(&config)).is_err());
    }
}
