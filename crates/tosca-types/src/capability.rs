//! # Capability Type Definitions
//!
//! A [`CapabilityTypeDef`] is one named capability declared on an owning
//! type, bound to its capability type in the catalog. Construction never
//! records diagnostics: whether a capability type actually exists is a
//! template-wide consistency question, so an unknown type simply leaves
//! [`definition`](CapabilityTypeDef::definition) empty.

use std::fmt;

use tosca_core::{
    DerivationChain, Mapping, TypeCatalog, Value, CAPABILITY_PREFIX, DERIVED_FROM,
};

use crate::inherit::merge_inherited;

const PROPERTIES: &str = "properties";
const DESCRIPTION: &str = "description";

/// A named capability of an owning type, resolved against the catalog.
#[derive(Clone)]
pub struct CapabilityTypeDef<'c> {
    name: String,
    declared_type: Option<String>,
    capability_type: Option<String>,
    owning_type: String,
    definition: Option<&'c Mapping>,
    catalog: &'c TypeCatalog,
}

impl<'c> CapabilityTypeDef<'c> {
    /// Bind capability `name`, declared with `declared_type` on
    /// `owning_type`, to its definition in `catalog`.
    pub fn new(
        name: impl Into<String>,
        declared_type: Option<&str>,
        owning_type: impl Into<String>,
        catalog: &'c TypeCatalog,
    ) -> Self {
        let name = name.into();
        let (capability_type, definition) = match declared_type {
            Some(declared) => {
                let resolved = catalog.resolve(declared, CAPABILITY_PREFIX);
                (Some(resolved.name), resolved.definition)
            }
            None => (None, None),
        };
        if definition.is_none() {
            tracing::debug!(
                capability = %name,
                declared_type = ?declared_type,
                "capability type has no definition in the catalog"
            );
        }
        Self {
            name,
            declared_type: declared_type.map(str::to_string),
            capability_type,
            owning_type: owning_type.into(),
            definition,
            catalog,
        }
    }

    /// Symbolic name of the capability on its owning type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type exactly as declared.
    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    /// The declared type resolved against the catalog namespaces.
    pub fn capability_type(&self) -> Option<&str> {
        self.capability_type.as_deref()
    }

    /// Name of the type that declares this capability.
    pub fn owning_type(&self) -> &str {
        &self.owning_type
    }

    /// The capability type's raw definition, when the catalog has it.
    pub fn definition(&self) -> Option<&'c Mapping> {
        self.definition
    }

    /// Whether the capability type resolved.
    pub fn is_defined(&self) -> bool {
        self.definition.is_some()
    }

    pub fn description(&self) -> Option<&'c str> {
        self.definition?.get(DESCRIPTION).and_then(Value::as_str)
    }

    pub fn derived_from(&self) -> Option<&'c str> {
        self.definition?.get(DERIVED_FROM).and_then(Value::as_str)
    }

    /// The capability bound to the parent capability type, keeping the same
    /// name and owner. `None` at the root or for a self-derivation.
    pub fn parent_type(&self) -> Option<CapabilityTypeDef<'c>> {
        let parent = self.derived_from()?;
        let resolved = self.catalog.resolve(parent, CAPABILITY_PREFIX);
        if self.capability_type.as_deref() == Some(resolved.name.as_str()) {
            return None;
        }
        Some(Self::new(
            self.name.clone(),
            Some(parent),
            self.owning_type.clone(),
            self.catalog,
        ))
    }

    /// Property definitions of the capability type, merged along its
    /// `derived_from` chain. Definitions closer to this type win.
    pub fn properties(&self) -> Mapping {
        let own = self
            .definition
            .and_then(|d| d.get(PROPERTIES))
            .cloned();
        let merged = self
            .chain()
            .links()
            .iter()
            .filter_map(|link| link.definition.get(PROPERTIES))
            .fold(own, |acc, inherited| Some(merge_inherited(acc, inherited)));
        match merged {
            Some(Value::Mapping(properties)) => properties,
            _ => Mapping::new(),
        }
    }

    /// A single merged property definition.
    pub fn property_def(&self, name: &str) -> Option<Value> {
        self.properties().remove(name)
    }

    /// Whether this capability's type, or any ancestor of it, is one of
    /// `type_names`. Short and namespaced names are accepted.
    pub fn inherits_from(&self, type_names: &[&str]) -> bool {
        let wanted: Vec<String> = type_names
            .iter()
            .map(|n| self.catalog.resolve(n, CAPABILITY_PREFIX).name)
            .collect();
        let Some(own) = self.capability_type.as_deref() else {
            return false;
        };
        wanted.iter().any(|w| w == own)
            || self
                .chain()
                .links()
                .iter()
                .any(|link| wanted.contains(&link.name))
    }

    fn chain(&self) -> DerivationChain<'c> {
        let origin = self.capability_type.as_deref().unwrap_or_default();
        self.catalog
            .derivation_chain(origin, self.derived_from(), CAPABILITY_PREFIX)
    }
}

impl PartialEq for CapabilityTypeDef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.declared_type == other.declared_type
            && self.capability_type == other.capability_type
            && self.owning_type == other.owning_type
            && self.definition == other.definition
            && std::ptr::eq(self.catalog, other.catalog)
    }
}

impl fmt::Debug for CapabilityTypeDef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityTypeDef")
            .field("name", &self.name)
            .field("capability_type", &self.capability_type)
            .field("owning_type", &self.owning_type)
            .field("defined", &self.definition.is_some())
            .finish()
    }
}
