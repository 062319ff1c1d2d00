//! # Type Catalog
//!
//! The catalog maps type names to raw definition records. It has two layers:
//!
//! - **Built-in** normative definitions, embedded from
//!   `definitions/builtin.yaml` and always addressed by their full
//!   `tosca.<family>.<Name>` names.
//! - **Custom** definitions supplied by callers, usually loaded from the
//!   `*_types` sections of one or more definition documents.
//!
//! ## Name Resolution
//!
//! A requested name is resolved under a family prefix (e.g. `tosca.groups.`):
//!
//! 1. `tosca:Name` is shortened to `Name` and expanded to `<prefix>Name`.
//! 2. A name that does not start with `tosca` is expanded to `<prefix>Name`.
//! 3. The expanded name is looked up among the built-ins; on a miss the
//!    (shortened) name is looked up among the custom definitions.
//!
//! The resolved name is the built-in name on a built-in hit and the
//! requested (shortened) name otherwise.
//!
//! ## Inheritance Walks
//!
//! [`TypeCatalog::derivation_chain`] follows `derived_from` links with a
//! visited set and the configured depth limit. It never recurses and always
//! terminates; the caller decides whether a cycle is worth a diagnostic.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::value::{Mapping, Value};

/// Namespace marker for normative types.
pub const TOSCA_NAMESPACE: &str = "tosca";
/// Family prefix for group types.
pub const GROUP_PREFIX: &str = "tosca.groups.";
/// Family prefix for capability types.
pub const CAPABILITY_PREFIX: &str = "tosca.capabilities.";
/// Section key naming a type's direct parent.
pub const DERIVED_FROM: &str = "derived_from";

/// Document sections that contain type definitions.
pub const TYPE_SECTIONS: &[&str] = &[
    "artifact_types",
    "capability_types",
    "data_types",
    "group_types",
    "interface_types",
    "node_types",
    "policy_types",
    "relationship_types",
];

const BUILTIN_DEFINITIONS: &str = include_str!("../definitions/builtin.yaml");
const BUILTIN_ORIGIN: &str = "builtin.yaml";

/// Tunables for resolution over a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Maximum number of ancestors followed before a walk is abandoned.
    pub max_derivation_depth: usize,
    /// Accept `name: <type>` as shorthand for `name: { type: <type> }` in
    /// capability declarations.
    pub accept_short_capability_form: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_derivation_depth: 64,
            accept_short_capability_form: true,
        }
    }
}

impl CatalogConfig {
    /// Parse a YAML configuration. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Config` for malformed YAML or unknown keys.
    pub fn from_yaml_str(source: &str, origin: &str) -> Result<Self, CatalogError> {
        // An empty document deserializes to unit, not to a struct.
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(source).map_err(|e| CatalogError::Config {
            origin: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let source = read_file(path)?;
        Self::from_yaml_str(&source, &path.display().to_string())
    }
}

/// Result of resolving a requested name under a family prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType<'a> {
    /// Canonical name (built-in full name, or the custom name).
    pub name: String,
    /// The definition, when the name resolves.
    pub definition: Option<&'a Mapping>,
}

/// One resolved ancestor on a `derived_from` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationLink<'a> {
    /// Canonical name of the ancestor.
    pub name: String,
    /// Its definition.
    pub definition: &'a Mapping,
}

/// Why a `derived_from` walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEnd {
    /// The last link has no `derived_from`.
    Root,
    /// A `derived_from` names a type the catalog does not define.
    Undefined(String),
    /// A `derived_from` names a type already on the chain.
    Cycle(String),
    /// The chain reached the configured depth limit.
    TooDeep(usize),
}

/// Ancestors of a type, nearest first, and how the walk ended.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivationChain<'a> {
    links: Vec<DerivationLink<'a>>,
    end: ChainEnd,
}

impl<'a> DerivationChain<'a> {
    /// Resolved ancestors, nearest first. Never contains the origin.
    pub fn links(&self) -> &[DerivationLink<'a>] {
        &self.links
    }

    /// How the walk ended.
    pub fn end(&self) -> &ChainEnd {
        &self.end
    }

    /// Ancestor names, nearest first.
    pub fn names(&self) -> Vec<&str> {
        self.links.iter().map(|l| l.name.as_str()).collect()
    }

    /// Consumes self and returns the links.
    pub fn into_links(self) -> Vec<DerivationLink<'a>> {
        self.links
    }
}

/// Catalog of built-in and custom type definitions.
///
/// ## Thread Safety
///
/// `TypeCatalog` is `Send + Sync` and is meant to be shared by reference.
/// Nothing mutates it during a validation pass.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    builtin: BTreeMap<String, Mapping>,
    custom: BTreeMap<String, Mapping>,
    /// Section name (e.g. `group_types`) → custom names loaded from it.
    sections: BTreeMap<String, BTreeSet<String>>,
    config: CatalogConfig,
}

impl TypeCatalog {
    /// A catalog holding the built-in normative definitions.
    ///
    /// # Errors
    ///
    /// Returns a `CatalogError` only if the embedded definitions are corrupt.
    pub fn new() -> Result<Self, CatalogError> {
        let mut catalog = Self::empty();
        for (_, name, definition) in parse_sections(BUILTIN_DEFINITIONS, BUILTIN_ORIGIN)? {
            catalog.builtin.insert(name, definition);
        }
        tracing::debug!(count = catalog.builtin.len(), "loaded built-in type definitions");
        Ok(catalog)
    }

    /// A catalog with no definitions at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Replace the resolution configuration.
    pub fn with_config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    /// The resolution configuration.
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Add or replace a custom definition. Returns the replaced definition.
    pub fn insert(&mut self, name: impl Into<String>, definition: Mapping) -> Option<Mapping> {
        self.custom.insert(name.into(), definition)
    }

    /// Add or replace a custom definition and file it under `section`.
    pub fn insert_in(
        &mut self,
        section: &str,
        name: impl Into<String>,
        definition: Mapping,
    ) -> Option<Mapping> {
        let name = name.into();
        if self.is_builtin(&name) {
            tracing::warn!(
                type_name = %name,
                section,
                "custom type shadows a built-in; lookups by name resolve to the built-in"
            );
        }
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(name.clone());
        self.insert(name, definition)
    }

    /// Load every `*_types` section of a YAML document as custom definitions.
    ///
    /// Other top-level keys (`tosca_definitions_version`, `imports`, ...)
    /// are ignored. A type defined twice keeps the later definition.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the document is not valid YAML, is not a
    /// mapping, or contains a definition that is not a mapping.
    pub fn extend_from_yaml_str(&mut self, source: &str, origin: &str) -> Result<usize, CatalogError> {
        let entries = parse_sections(source, origin)?;
        let count = entries.len();
        for (section, name, definition) in entries {
            if self.insert_in(&section, name.clone(), definition).is_some() {
                tracing::warn!(type_name = %name, origin, "type redefined; later definition wins");
            }
        }
        tracing::debug!(origin, count, "loaded custom type definitions");
        Ok(count)
    }

    /// Read a definitions file and load it with [`extend_from_yaml_str`](Self::extend_from_yaml_str).
    pub fn load_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let source = read_file(path)?;
        self.extend_from_yaml_str(&source, &path.display().to_string())
    }

    /// Exact-name lookup, built-ins first.
    pub fn get(&self, name: &str) -> Option<&Mapping> {
        self.builtin.get(name).or_else(|| self.custom.get(name))
    }

    /// Exact-name lookup among the custom definitions only.
    pub fn custom(&self, name: &str) -> Option<&Mapping> {
        self.custom.get(name)
    }

    /// Whether `name` is a built-in definition.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin.contains_key(name)
    }

    /// Custom type names loaded from `section`, sorted.
    pub fn names_in(&self, section: &str) -> Vec<&str> {
        self.sections
            .get(section)
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Total number of definitions (built-in and custom).
    pub fn len(&self) -> usize {
        self.builtin.len() + self.custom.len()
    }

    /// Returns true if the catalog has no definitions.
    pub fn is_empty(&self) -> bool {
        self.builtin.is_empty() && self.custom.is_empty()
    }

    /// Resolve `name` under a family `prefix`. See the module docs.
    pub fn resolve(&self, name: &str, prefix: &str) -> ResolvedType<'_> {
        let namespaced = format!("{TOSCA_NAMESPACE}:");
        let short = name.strip_prefix(namespaced.as_str()).unwrap_or(name);
        let expanded = if short.len() != name.len() || !short.starts_with(TOSCA_NAMESPACE) {
            format!("{prefix}{short}")
        } else {
            short.to_string()
        };

        if let Some(definition) = self.builtin.get(&expanded) {
            return ResolvedType {
                name: expanded,
                definition: Some(definition),
            };
        }
        ResolvedType {
            name: short.to_string(),
            definition: self.custom.get(short),
        }
    }

    /// Walk `derived_from` links starting at `parent`, the direct parent of
    /// the type `origin`.
    ///
    /// The origin is treated as already visited, so a chain leading back to
    /// it ends in [`ChainEnd::Cycle`]. At most `max_derivation_depth`
    /// ancestors are collected.
    pub fn derivation_chain(
        &self,
        origin: &str,
        parent: Option<&str>,
        prefix: &str,
    ) -> DerivationChain<'_> {
        let mut visited = BTreeSet::from([origin.to_string()]);
        let mut links = Vec::new();
        let mut next = parent;

        let end = loop {
            let Some(requested) = next else {
                break ChainEnd::Root;
            };
            let resolved = self.resolve(requested, prefix);
            if !visited.insert(resolved.name.clone()) {
                break ChainEnd::Cycle(resolved.name);
            }
            let Some(definition) = resolved.definition else {
                break ChainEnd::Undefined(resolved.name);
            };
            if links.len() >= self.config.max_derivation_depth {
                break ChainEnd::TooDeep(self.config.max_derivation_depth);
            }
            next = definition.get(DERIVED_FROM).and_then(Value::as_str);
            links.push(DerivationLink {
                name: resolved.name,
                definition,
            });
        };

        DerivationChain { links, end }
    }
}

fn read_file(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Extract `(section, name, definition)` triples from a definitions document.
fn parse_sections(
    source: &str,
    origin: &str,
) -> Result<Vec<(String, String, Mapping)>, CatalogError> {
    let document = Value::from_yaml_str(source, origin)?;
    let document = match document {
        Value::Mapping(m) => m,
        // An empty file parses as null; treat it as an empty document.
        v if v.is_null() => return Ok(Vec::new()),
        _ => {
            return Err(CatalogError::NotAMapping {
                origin: origin.to_string(),
                section: "document".to_string(),
            })
        }
    };

    let mut entries = Vec::new();
    for section in TYPE_SECTIONS {
        let Some(types) = document.get(*section) else {
            continue;
        };
        if types.is_null() {
            continue;
        }
        let Some(types) = types.as_mapping() else {
            return Err(CatalogError::NotAMapping {
                origin: origin.to_string(),
                section: section.to_string(),
            });
        };
        for (name, definition) in types {
            let definition = match definition {
                Value::Mapping(m) => m.clone(),
                v if v.is_null() => Mapping::new(),
                _ => {
                    return Err(CatalogError::InvalidDefinition {
                        origin: origin.to_string(),
                        name: name.clone(),
                    })
                }
            };
            entries.push((section.to_string(), name.clone(), definition));
        }
    }
    Ok(entries)
}
