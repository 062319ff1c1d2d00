//! # Group Type Definitions
//!
//! [`GroupType`] wraps one raw group type definition and the catalog it was
//! resolved from. Construction validates the definition and records every
//! violation in the caller's [`ErrorSink`]; it never fails.
//!
//! ## Validation at Construction
//!
//! 1. Every key outside [`Section::ALL`] → `UnknownField`.
//! 2. A `metadata` section → [`validate_metadata`].
//! 3. A name the catalog cannot resolve ([`GroupType::new`] only) →
//!    `UndefinedType`, and the type is kept with no definition.
//!
//! ## Inheritance
//!
//! - [`GroupType::parent_type`] is one step: it constructs (and therefore
//!   validates) the direct parent. Calling it repeatedly on a cyclic catalog
//!   does not terminate by itself.
//! - [`GroupType::ancestors`] is the bounded walk. It follows `derived_from`
//!   under a visited set and the catalog's depth limit, and records
//!   `DerivationCycle` / `DerivationTooDeep` when the walk is cut short.
//! - Capabilities and `all_requirements` merge sections inherited from
//!   ancestors; closer definitions win. These merges use the same guarded
//!   walk and record nothing.

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use tosca_core::{
    ChainEnd, DerivationChain, ErrorSink, Mapping, Scalar, TypeCatalog, ValidationError, Value,
    GROUP_PREFIX,
};

use crate::capability::CapabilityTypeDef;
use crate::inherit::merge_inherited;
use crate::metadata::validate_metadata;
use crate::section::Section;

/// A group type definition bound to a type catalog.
#[derive(Clone)]
pub struct GroupType<'c> {
    type_name: String,
    definition: Option<&'c Mapping>,
    catalog: &'c TypeCatalog,
    present: BTreeSet<Section>,
    description: Option<String>,
    version: Option<String>,
    capabilities: OnceCell<Vec<CapabilityTypeDef<'c>>>,
}

impl<'c> GroupType<'c> {
    /// Resolve `type_name` in `catalog` and validate its definition.
    ///
    /// Short (`Root`) and namespaced (`tosca:Root`) forms of built-in names
    /// are accepted. An unresolvable name records `UndefinedType` and yields
    /// a type with no definition.
    pub fn new(type_name: &str, catalog: &'c TypeCatalog, sink: &mut dyn ErrorSink) -> Self {
        let resolved = catalog.resolve(type_name, GROUP_PREFIX);
        if resolved.definition.is_none() {
            tracing::warn!(type_name = %resolved.name, "group type not found in catalog");
            sink.record(ValidationError::UndefinedType {
                name: resolved.name.clone(),
            });
        }
        Self::with_definition(resolved.name, resolved.definition, catalog, sink)
    }

    /// Wrap an explicit raw definition and validate it.
    pub fn with_definition(
        type_name: impl Into<String>,
        definition: Option<&'c Mapping>,
        catalog: &'c TypeCatalog,
        sink: &mut dyn ErrorSink,
    ) -> Self {
        let group = Self::unvalidated(type_name.into(), definition, catalog);
        group.validate_fields(sink);
        if let Some(metadata) = group.section(Section::Metadata) {
            validate_metadata(&group.type_name, metadata, sink);
        }
        group
    }

    fn unvalidated(
        type_name: String,
        definition: Option<&'c Mapping>,
        catalog: &'c TypeCatalog,
    ) -> Self {
        let present: BTreeSet<Section> = definition
            .map(|d| d.keys().filter_map(|k| Section::from_key(k)).collect())
            .unwrap_or_default();
        // Null reads as absent; collections render as JSON.
        let text = |section: Section| {
            let value = definition?.get(section.as_str())?;
            match value.as_scalar() {
                Some(Scalar::Null) => None,
                _ => Some(value.to_string()),
            }
        };
        Self {
            description: text(Section::Description),
            version: text(Section::Version),
            type_name,
            definition,
            catalog,
            present,
            capabilities: OnceCell::new(),
        }
    }

    fn validate_fields(&self, sink: &mut dyn ErrorSink) {
        let Some(definition) = self.definition else {
            return;
        };
        for field in definition.keys() {
            if Section::from_key(field).is_none() {
                tracing::debug!(type_name = %self.type_name, field = %field, "unknown field in group type");
                sink.record(ValidationError::UnknownField {
                    what: format!("Group Type {}", self.type_name),
                    field: field.clone(),
                });
            }
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The raw definition, absent when the name did not resolve.
    pub fn definition(&self) -> Option<&'c Mapping> {
        self.definition
    }

    /// The catalog this type was resolved from.
    pub fn catalog(&self) -> &'c TypeCatalog {
        self.catalog
    }

    /// Whether the definition contains `section`.
    pub fn has_section(&self, section: Section) -> bool {
        self.present.contains(&section)
    }

    /// Raw value of `section`, if present.
    pub fn section(&self, section: Section) -> Option<&'c Value> {
        self.definition?.get(section.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Name of the direct parent, as written.
    pub fn derived_from(&self) -> Option<&'c str> {
        self.section(Section::DerivedFrom).and_then(Value::as_str)
    }

    pub fn metadata(&self) -> Option<&'c Mapping> {
        self.section(Section::Metadata).and_then(Value::as_mapping)
    }

    /// Property definitions, passed through unvalidated.
    pub fn properties(&self) -> Option<&'c Value> {
        self.section(Section::Properties)
    }

    /// Member type names, passed through unvalidated.
    pub fn members(&self) -> Option<&'c Value> {
        self.section(Section::Members)
    }

    pub fn interfaces(&self) -> Option<&'c Value> {
        self.section(Section::Interfaces)
    }

    /// The own `requirements` section, unmodified.
    pub fn requirements(&self) -> Option<&'c Value> {
        self.section(Section::Requirements)
    }

    /// Requirements including those inherited from ancestors.
    pub fn all_requirements(&self) -> Option<Value> {
        self.inherited(Section::Requirements)
    }

    /// Capabilities of this type, including inherited ones. Computed on first
    /// access and cached.
    pub fn capabilities(&self) -> &[CapabilityTypeDef<'c>] {
        self.capabilities.get_or_init(|| self.resolve_capabilities())
    }

    /// Capabilities keyed by name.
    pub fn capabilities_by_name(&self) -> BTreeMap<&str, &CapabilityTypeDef<'c>> {
        self.capabilities()
            .iter()
            .map(|cap| (cap.name(), cap))
            .collect()
    }

    /// Look up one capability. Unknown names yield `None`.
    pub fn capability(&self, name: &str) -> Option<&CapabilityTypeDef<'c>> {
        self.capabilities().iter().find(|cap| cap.name() == name)
    }

    /// Resolved type of one capability.
    pub fn capability_type(&self, name: &str) -> Option<&str> {
        self.capability(name)?.capability_type()
    }

    fn resolve_capabilities(&self) -> Vec<CapabilityTypeDef<'c>> {
        let Some(Value::Mapping(declarations)) = self.inherited(Section::Capabilities) else {
            return Vec::new();
        };
        let short_form = self.catalog.config().accept_short_capability_form;
        declarations
            .iter()
            .map(|(name, declaration)| {
                let declared = match declaration {
                    Value::Mapping(fields) => fields.get("type").and_then(Value::as_str),
                    Value::Scalar(Scalar::String(short)) if short_form => Some(short.as_str()),
                    _ => None,
                };
                CapabilityTypeDef::new(name.clone(), declared, self.type_name.clone(), self.catalog)
            })
            .collect()
    }

    /// The direct parent type, constructed (and validated) from the catalog.
    ///
    /// `None` when there is no definition or no `derived_from`. A type that
    /// derives from itself records `DerivationCycle` and yields `None`.
    pub fn parent_type(&self, sink: &mut dyn ErrorSink) -> Option<GroupType<'c>> {
        let parent = self.derived_from()?;
        let resolved = self.catalog.resolve(parent, GROUP_PREFIX);
        if resolved.name == self.type_name {
            tracing::warn!(type_name = %self.type_name, "group type derives from itself");
            sink.record(ValidationError::DerivationCycle {
                type_name: self.type_name.clone(),
                chain: vec![self.type_name.clone(), resolved.name],
            });
            return None;
        }
        tracing::debug!(type_name = %self.type_name, parent = %resolved.name, "resolving parent group type");
        Some(GroupType::new(parent, self.catalog, sink))
    }

    /// Every ancestor, nearest first, walked under the cycle and depth guard.
    ///
    /// Ancestors are not re-validated; each is validated when constructed in
    /// its own right. A walk cut short records one diagnostic.
    pub fn ancestors(&self, sink: &mut dyn ErrorSink) -> Vec<GroupType<'c>> {
        let chain = self.chain();
        match chain.end() {
            ChainEnd::Root => {}
            ChainEnd::Undefined(name) => sink.record(ValidationError::UndefinedType {
                name: name.clone(),
            }),
            ChainEnd::Cycle(repeated) => {
                let mut path = vec![self.type_name.clone()];
                path.extend(chain.links().iter().map(|link| link.name.clone()));
                path.push(repeated.clone());
                tracing::warn!(type_name = %self.type_name, chain = %path.join(" -> "), "cyclic derived_from chain");
                sink.record(ValidationError::DerivationCycle {
                    type_name: self.type_name.clone(),
                    chain: path,
                });
            }
            ChainEnd::TooDeep(depth) => {
                tracing::warn!(type_name = %self.type_name, depth, "derived_from chain exceeds depth limit");
                sink.record(ValidationError::DerivationTooDeep {
                    type_name: self.type_name.clone(),
                    depth: *depth,
                });
            }
        }
        chain
            .into_links()
            .into_iter()
            .map(|link| Self::unvalidated(link.name, Some(link.definition), self.catalog))
            .collect()
    }

    /// Whether this type is `type_name` or derives from it.
    pub fn is_derived_from(&self, type_name: &str) -> bool {
        let target = self.catalog.resolve(type_name, GROUP_PREFIX).name;
        self.type_name == target || self.chain().links().iter().any(|link| link.name == target)
    }

    fn chain(&self) -> DerivationChain<'c> {
        self.catalog
            .derivation_chain(&self.type_name, self.derived_from(), GROUP_PREFIX)
    }

    fn inherited(&self, section: Section) -> Option<Value> {
        let own = self.section(section).cloned();
        self.chain()
            .links()
            .iter()
            .filter_map(|link| link.definition.get(section.as_str()))
            .fold(own, |acc, inherited| Some(merge_inherited(acc, inherited)))
    }
}

impl PartialEq for GroupType<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
            && self.definition == other.definition
            && std::ptr::eq(self.catalog, other.catalog)
    }
}

impl fmt::Debug for GroupType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupType")
            .field("type_name", &self.type_name)
            .field("sections", &self.present)
            .field("defined", &self.definition.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tosca_core::{Diagnostics, ErrorKind};

    fn catalog(doc: &str) -> TypeCatalog {
        let mut catalog = TypeCatalog::new().unwrap();
        catalog.extend_from_yaml_str(doc, "test.yaml").unwrap();
        catalog
    }

    #[test]
    fn test_builtin_root_resolves_from_short_forms() {
        let catalog = TypeCatalog::new().unwrap();
        let mut diags = Diagnostics::new();
        for name in ["tosca.groups.Root", "tosca:Root", "Root"] {
            let group = GroupType::new(name, &catalog, &mut diags);
            assert_eq!(group.type_name(), "tosca.groups.Root");
            assert!(group.description().is_some());
            assert!(group.interfaces().and_then(|i| i.get("Standard")).is_some());
        }
        assert!(diags.is_empty(), "unexpected diagnostics:\n{diags}");
    }

    #[test]
    fn test_undefined_name_is_recorded_and_kept() {
        let catalog = TypeCatalog::new().unwrap();
        let mut diags = Diagnostics::new();
        let group = GroupType::new("groups.Missing", &catalog, &mut diags);
        assert!(group.definition().is_none());
        assert!(group.parent_type(&mut diags).is_none());
        assert!(group.capabilities().is_empty());
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags.errors()[0],
            ValidationError::UndefinedType {
                name: "groups.Missing".to_string()
            }
        );
    }

    #[test]
    fn test_presence_flags_follow_the_definition() {
        let catalog = catalog(
            r#"
group_types:
  g.Group:
    description: d
    members: [a.Node]
    bogus: 1
"#,
        );
        let mut diags = Diagnostics::new();
        let group = GroupType::new("g.Group", &catalog, &mut diags);
        assert!(group.has_section(Section::Description));
        assert!(group.has_section(Section::Members));
        assert!(!group.has_section(Section::Capabilities));
        assert_eq!(diags.count(ErrorKind::UnknownField), 1);
    }

    #[test]
    fn test_numeric_version_is_rendered() {
        let catalog = catalog("group_types:\n  g.Group:\n    version: 1.0\n");
        let group = GroupType::new("g.Group", &catalog, &mut Diagnostics::new());
        assert_eq!(group.version(), Some("1.0"));
        assert_eq!(group.description(), None);
    }

    #[test]
    fn test_short_form_capability_declaration() {
        let catalog = catalog(
            r#"
group_types:
  g.Group:
    capabilities:
      scale: tosca.capabilities.Scalable
"#,
        );
        let group = GroupType::new("g.Group", &catalog, &mut Diagnostics::new());
        assert_eq!(group.capability_type("scale"), Some("tosca.capabilities.Scalable"));
    }

    #[test]
    fn test_short_form_can_be_disabled() {
        let mut catalog = TypeCatalog::new().unwrap().with_config(tosca_core::CatalogConfig {
            accept_short_capability_form: false,
            ..Default::default()
        });
        catalog
            .extend_from_yaml_str(
                "group_types:\n  g.Group:\n    capabilities:\n      scale: tosca.capabilities.Scalable\n",
                "test.yaml",
            )
            .unwrap();
        let group = GroupType::new("g.Group", &catalog, &mut Diagnostics::new());
        let cap = group.capability("scale").unwrap();
        assert_eq!(cap.capability_type(), None);
    }

    #[test]
    fn test_capabilities_are_inherited_and_overridden() {
        let catalog = catalog(
            r#"
group_types:
  g.Base:
    capabilities:
      host:
        type: tosca.capabilities.Container
      endpoint:
        type: tosca.capabilities.Endpoint
  g.Child:
    derived_from: g.Base
    capabilities:
      host:
        type: tosca.capabilities.Node
"#,
        );
        let group = GroupType::new("g.Child", &catalog, &mut Diagnostics::new());
        assert_eq!(group.capabilities().len(), 2);
        assert_eq!(group.capability_type("host"), Some("tosca.capabilities.Node"));
        assert_eq!(group.capability_type("endpoint"), Some("tosca.capabilities.Endpoint"));
        assert!(group.capabilities().iter().all(|c| c.owning_type() == "g.Child"));
    }

    #[test]
    fn test_null_sections_inherit_from_the_parent() {
        let catalog = catalog(
            r#"
group_types:
  g.Base:
    capabilities:
      host:
        type: tosca.capabilities.Container
    requirements:
      - storage: tosca.capabilities.Attachment
  g.Child:
    derived_from: g.Base
    capabilities:
    requirements: []
"#,
        );
        let group = GroupType::new("g.Child", &catalog, &mut Diagnostics::new());
        assert_eq!(group.capabilities().len(), 1);
        assert_eq!(group.capability_type("host"), Some("tosca.capabilities.Container"));
        assert_eq!(
            group.all_requirements().as_ref().and_then(Value::as_sequence).map(<[_]>::len),
            Some(1)
        );
        assert!(group.requirements().is_some_and(Value::is_empty));
    }

    #[test]
    fn test_null_description_and_version_are_absent() {
        let catalog = catalog(
            "group_types:\n  g.Group:\n    description:\n    version: ~\n",
        );
        let group = GroupType::new("g.Group", &catalog, &mut Diagnostics::new());
        assert!(group.has_section(Section::Description));
        assert_eq!(group.description(), None);
        assert_eq!(group.version(), None);
    }

    #[test]
    fn test_requirements_own_and_inherited() {
        let catalog = catalog(
            r#"
group_types:
  g.Base:
    requirements:
      - storage: tosca.capabilities.Attachment
  g.Child:
    derived_from: g.Base
    requirements:
      - network: tosca.capabilities.network.Linkable
"#,
        );
        let group = GroupType::new("g.Child", &catalog, &mut Diagnostics::new());
        assert_eq!(group.requirements().and_then(Value::as_sequence).map(<[_]>::len), Some(1));
        let all = group.all_requirements().unwrap();
        assert_eq!(all.as_sequence().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_is_derived_from_walks_the_chain() {
        let catalog = catalog(
            r#"
group_types:
  g.Base:
    derived_from: tosca.groups.Root
  g.Child:
    derived_from: g.Base
"#,
        );
        let group = GroupType::new("g.Child", &catalog, &mut Diagnostics::new());
        assert!(group.is_derived_from("g.Child"));
        assert!(group.is_derived_from("g.Base"));
        assert!(group.is_derived_from("tosca:Root"));
        assert!(!group.is_derived_from("g.Other"));
    }

    #[test]
    fn test_self_derivation_is_rejected() {
        let catalog = catalog("group_types:\n  g.Loop:\n    derived_from: g.Loop\n");
        let mut diags = Diagnostics::new();
        let group = GroupType::new("g.Loop", &catalog, &mut diags);
        assert!(group.parent_type(&mut diags).is_none());
        assert_eq!(diags.count(ErrorKind::DerivationCycle), 1);
        assert!(group.ancestors(&mut diags).is_empty());
        assert_eq!(diags.count(ErrorKind::DerivationCycle), 2);
    }

    #[test]
    fn test_ancestors_report_undefined_parent() {
        let catalog = catalog("group_types:\n  g.Orphan:\n    derived_from: g.Gone\n");
        let mut diags = Diagnostics::new();
        let group = GroupType::new("g.Orphan", &catalog, &mut diags);
        assert!(group.ancestors(&mut diags).is_empty());
        assert_eq!(
            diags.errors(),
            &[ValidationError::UndefinedType {
                name: "g.Gone".to_string()
            }]
        );
    }

    #[test]
    fn test_ancestors_are_not_revalidated() {
        let catalog = catalog(
            r#"
group_types:
  g.Base:
    bogus: 1
  g.Child:
    derived_from: g.Base
"#,
        );
        let mut diags = Diagnostics::new();
        let group = GroupType::new("g.Child", &catalog, &mut diags);
        let ancestors = group.ancestors(&mut diags);
        assert_eq!(ancestors.len(), 1);
        assert_eq!(ancestors[0].type_name(), "g.Base");
        assert!(diags.is_empty());
        // The one-step parent is constructed, so it is validated.
        let parent = group.parent_type(&mut diags).unwrap();
        assert_eq!(parent, ancestors[0]);
        assert_eq!(diags.count(ErrorKind::UnknownField), 1);
    }

    #[test]
    fn test_debug_omits_catalog() {
        let catalog = TypeCatalog::new().unwrap();
        let group = GroupType::new("tosca.groups.Root", &catalog, &mut Diagnostics::new());
        let debug = format!("{group:?}");
        assert!(debug.contains("tosca.groups.Root"));
        assert!(!debug.contains("capabilities.Container"));
    }
}
