//! # Error Types — Validation Records and Loading Failures
//!
//! Two families, kept apart on purpose:
//!
//! - [`ValidationError`] is a *record*, not a failure. Validators push it into
//!   an [`ErrorSink`](crate::ErrorSink) and keep going, so one pass over a
//!   document reports every schema violation together.
//! - [`CatalogError`] is a hard failure while loading definitions (unreadable
//!   file, malformed YAML, a definition that is not a mapping). It is returned
//!   through `Result` and aborts the load.
//!
//! Every validation record carries a kind tag, a context string naming the
//! owning type, and the offending field or value.

use serde::Serialize;
use thiserror::Error;

/// Kind tag of a validation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ErrorKind {
    /// A key is not part of the fixed section schema.
    #[serde(rename = "UnknownFieldError")]
    UnknownField,
    /// A declared type does not match the expected literal, or a type name
    /// does not resolve in the catalog.
    #[serde(rename = "InvalidTypeError")]
    InvalidType,
    /// A `derived_from` chain revisits a type or exceeds the depth limit.
    #[serde(rename = "DerivationCycleError")]
    DerivationCycle,
}

impl ErrorKind {
    /// Stable tag used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownField => "UnknownFieldError",
            Self::InvalidType => "InvalidTypeError",
            Self::DerivationCycle => "DerivationCycleError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single, non-fatal schema violation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A definition contains a key outside its section schema.
    #[error("{what} contains unknown field \"{field}\". Refer to the definition to verify valid values.")]
    UnknownField {
        /// Owning definition, e.g. `Group Type mycompany.groups.Cluster`.
        what: String,
        /// The offending key.
        field: String,
    },

    /// A declared `type` does not match the expected literal.
    #[error("Type \"{value}\" defined in {what} is not a valid type.")]
    InvalidType {
        /// Where the declaration sits, e.g. `group type "x" metadata "owner"`.
        what: String,
        /// The declared type as written (`null` when missing).
        value: String,
    },

    /// A type name does not resolve to any definition in the catalog.
    #[error("Type \"{name}\" is not a valid type.")]
    UndefinedType {
        /// The name as resolved against the catalog namespaces.
        name: String,
    },

    /// Following `derived_from` revisits a type already on the chain.
    #[error("Type \"{type_name}\" has a cyclic derived_from chain: {}", .chain.join(" -> "))]
    DerivationCycle {
        /// The type whose chain was walked.
        type_name: String,
        /// Names in visiting order, ending with the repeated name.
        chain: Vec<String>,
    },

    /// Following `derived_from` exceeds the configured depth limit.
    #[error("Type \"{type_name}\" derives through more than {depth} ancestors")]
    DerivationTooDeep {
        /// The type whose chain was walked.
        type_name: String,
        /// The configured limit.
        depth: usize,
    },
}

impl ValidationError {
    /// The kind tag of this record.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownField { .. } => ErrorKind::UnknownField,
            Self::InvalidType { .. } | Self::UndefinedType { .. } => ErrorKind::InvalidType,
            Self::DerivationCycle { .. } | Self::DerivationTooDeep { .. } => {
                ErrorKind::DerivationCycle
            }
        }
    }

    /// Human-readable context identifying the owning definition.
    pub fn context(&self) -> &str {
        match self {
            Self::UnknownField { what, .. } | Self::InvalidType { what, .. } => what,
            Self::UndefinedType { name } => name,
            Self::DerivationCycle { type_name, .. } | Self::DerivationTooDeep { type_name, .. } => {
                type_name
            }
        }
    }

    /// The offending field, value, or name.
    pub fn subject(&self) -> String {
        match self {
            Self::UnknownField { field, .. } => field.clone(),
            Self::InvalidType { value, .. } => value.clone(),
            Self::UndefinedType { name } => name.clone(),
            Self::DerivationCycle { chain, .. } => chain.last().cloned().unwrap_or_default(),
            Self::DerivationTooDeep { depth, .. } => depth.to_string(),
        }
    }
}

/// Failure while loading definitions into a catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The document could not be parsed as YAML.
    #[error("invalid YAML in '{origin}': {reason}")]
    Yaml {
        /// File path or other origin label.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// A mapping key is neither a string, number, nor boolean.
    #[error("unsupported mapping key in '{origin}': {key}")]
    UnsupportedKey {
        /// File path or other origin label.
        origin: String,
        /// Debug rendering of the key.
        key: String,
    },

    /// A document or type section is not a mapping.
    #[error("section '{section}' in '{origin}' must be a mapping")]
    NotAMapping {
        /// File path or other origin label.
        origin: String,
        /// The section name (`document` for the top level).
        section: String,
    },

    /// A single type definition is not a mapping.
    #[error("definition of type '{name}' in '{origin}' must be a mapping")]
    InvalidDefinition {
        /// File path or other origin label.
        origin: String,
        /// The type name.
        name: String,
    },

    /// The catalog configuration could not be parsed.
    #[error("invalid catalog configuration in '{origin}': {reason}")]
    Config {
        /// File path or other origin label.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// IO error reading a definitions file.
    #[error("io error reading '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}
