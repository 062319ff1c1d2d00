//! # tosca-core — Foundational Types for TOSCA Type Resolution
//!
//! This crate is the leaf of the workspace. It defines the data every type
//! definition model is built from, and the contract by which validators
//! report problems without aborting.
//!
//! ## Key Design Principles
//!
//! 1. **Tagged values, not duck typing.** Definition records are decoded into
//!    [`Value`] (`Scalar | Sequence | Mapping`). Validators pattern-match on
//!    it instead of probing for keys on arbitrary data.
//!
//! 2. **One catalog, borrowed everywhere.** [`TypeCatalog`] holds the built-in
//!    normative definitions plus user-supplied custom definitions. Type models
//!    keep `&TypeCatalog`, never a copy. The catalog is read-only for the
//!    duration of a validation pass.
//!
//! 3. **Batch, don't abort.** Schema violations are [`ValidationError`]
//!    records pushed into an [`ErrorSink`]. Construction of a type model
//!    never fails on a violation; the pass owner decides what is fatal.
//!
//! 4. **Bounded inheritance walks.** [`TypeCatalog::derivation_chain`] follows
//!    `derived_from` with a visited set and a configurable depth limit, so a
//!    malformed catalog cannot recurse forever.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tosca-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Loading failures (I/O, malformed YAML) are `CatalogError` results;
//!   schema violations are never `Err`.

pub mod catalog;
pub mod error;
pub mod sink;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use catalog::{
    CatalogConfig, ChainEnd, DerivationChain, DerivationLink, ResolvedType, TypeCatalog,
    CAPABILITY_PREFIX, DERIVED_FROM, GROUP_PREFIX, TOSCA_NAMESPACE, TYPE_SECTIONS,
};
pub use error::{CatalogError, ErrorKind, ValidationError};
pub use sink::{Diagnostics, ErrorSink, SharedSink};
pub use value::{Mapping, Scalar, Value};
