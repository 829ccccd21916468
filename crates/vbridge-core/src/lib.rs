//! # vbridge-core — Foundational Types for the Validation Bridge
//!
//! This crate defines the value types shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Two path languages, two types.** Backend paths are `PathExpr`
//!    strings with `?` wildcards. Configuration paths are `ConcretePath`
//!    step sequences. The two never mix implicitly.
//!
//! 2. **Known/unknown is part of the value.** `ConfigValue::Unknown` marks a
//!    value that is not resolved yet; a tree containing one is not fully
//!    known and must not be materialized.
//!
//! 3. **Diagnostics carry their own location.** Every `Diagnostic` names the
//!    concrete attribute path it belongs to, never a backend path.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vbridge-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod diagnostic;
pub mod error;
pub mod options;
pub mod path;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::BridgeError;
pub use options::BridgeOptions;
pub use path::{ConcretePath, PathExpr, PathStep, WILDCARD};
pub use value::{ConfigStore, ConfigValue};
