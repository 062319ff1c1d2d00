//! # Definition Values
//!
//! A small tagged value type for raw definition records. Documents arrive
//! as `serde_yaml::Value`; they are converted once, at the loading boundary,
//! into [`Value`] so that every validator can match exhaustively on
//! scalar / sequence / mapping instead of probing untyped data.
//!
//! Mapping keys are always strings. YAML allows richer keys; numbers and
//! booleans are stringified, anything else is rejected at conversion time.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::CatalogError;

/// A mapping from section or entry key to value.
pub type Mapping = BTreeMap<String, Value>;

/// A scalar leaf of a definition record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Explicit or implicit null (`~`, empty value).
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer that fits in an `i64`.
    Int(i64),
    /// Any other number.
    Float(f64),
    /// String.
    String(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            // Keep the decimal point on integral floats so `1.0` stays `1.0`.
            Self::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// A value in a raw definition record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Leaf value.
    Scalar(Scalar),
    /// Ordered list of values.
    Sequence(Vec<Value>),
    /// String-keyed mapping.
    Mapping(Mapping),
}

impl Value {
    /// The null value.
    pub const fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    /// Returns the string content if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns the scalar if this is a leaf.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the mapping if this is a mapping.
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the items if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Whether this is null, an empty mapping or an empty sequence.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => matches!(s, Scalar::Null),
            Self::Sequence(items) => items.is_empty(),
            Self::Mapping(m) => m.is_empty(),
        }
    }

    /// Whether this is the null scalar.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    /// Look up `key` when this is a mapping. Returns `None` for any other shape.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Parse a YAML document into a value.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Yaml` for malformed YAML and
    /// `CatalogError::UnsupportedKey` for mapping keys that are not scalars.
    pub fn from_yaml_str(source: &str, origin: &str) -> Result<Self, CatalogError> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(source).map_err(|e| CatalogError::Yaml {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_yaml(&yaml, origin)
    }

    /// Convert a parsed YAML value, attributing failures to `origin`.
    ///
    /// YAML tags are ignored and the tagged inner value is converted.
    pub fn from_yaml(yaml: &serde_yaml::Value, origin: &str) -> Result<Self, CatalogError> {
        let value = match yaml {
            serde_yaml::Value::Null => Self::null(),
            serde_yaml::Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Scalar(Scalar::Int(i))
                } else {
                    // u64 beyond i64::MAX and real numbers both land here.
                    Self::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            serde_yaml::Value::String(s) => Self::Scalar(Scalar::String(s.clone())),
            serde_yaml::Value::Sequence(seq) => Self::Sequence(
                seq.iter()
                    .map(|item| Self::from_yaml(item, origin))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut mapping = Mapping::new();
                for (k, v) in map {
                    let key = match k {
                        serde_yaml::Value::String(s) => s.clone(),
                        serde_yaml::Value::Number(n) => n.to_string(),
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        other => {
                            return Err(CatalogError::UnsupportedKey {
                                origin: origin.to_string(),
                                key: format!("{other:?}"),
                            })
                        }
                    };
                    mapping.insert(key, Self::from_yaml(v, origin)?);
                }
                Self::Mapping(mapping)
            }
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(&tagged.value, origin)?,
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            other => {
                let rendered = serde_json::to_string(other).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Scalar(Scalar::Int(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

impl From<Mapping> for Value {
    fn from(m: Mapping) -> Self {
        Self::Mapping(m)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}
