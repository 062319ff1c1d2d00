//! # tosca-types — Type Definition Models
//!
//! Typed views over raw type definitions held in a
//! [`TypeCatalog`](tosca_core::TypeCatalog).
//!
//! ## Group Types (`group`)
//!
//! [`GroupType`] validates a group type definition against the fixed
//! [`Section`] schema and its `metadata` block when constructed, recording
//! every violation in an [`ErrorSink`](tosca_core::ErrorSink). It exposes the
//! raw sections, resolves declared capabilities into [`CapabilityTypeDef`]
//! values, and walks `derived_from` to parents and ancestors.
//!
//! ## Capability Types (`capability`)
//!
//! [`CapabilityTypeDef`] binds one named capability to its capability type,
//! with merged property definitions and an inheritance check.
//!
//! ## Crate Policy
//!
//! - Depends only on `tosca-core` internally.
//! - Models borrow the catalog; they never copy definitions out of it.
//! - Constructors never fail. Violations are sink records.

pub mod capability;
pub mod group;
mod inherit;
pub mod metadata;
pub mod section;

pub use capability::CapabilityTypeDef;
pub use group::GroupType;
pub use metadata::{validate_metadata, MAP_TYPES, STRING_TYPE};
pub use section::Section;
