//! # vbridge-schema — Attribute Schema Tree
//!
//! Read-only model of the configuration schema the bridge validates against.
//!
//! ## Attribute Model (`attribute`)
//!
//! Every attribute has exactly one [`ValueKind`] from a closed set:
//! bool, int32, int64, float32, float64, string, dynamic, list, set, map,
//! and object. Each kind carries its own validator list, and
//! [`ValueKind::validators`] is the single dispatch point from kind to
//! validators. Scalar collections additionally carry element validators.
//!
//! ## Schema Walker (`walker`)
//!
//! [`walk`] visits every attribute once, pre-order, and records the
//! declaration path of every store validator's path expression in an
//! [`ExpressionTable`]. The bridge builds this table exactly once.
//!
//! ## Loading (`loader`)
//!
//! [`load_schema`] reads a schema from a `.yaml`, `.yml`, or `.json` file.
//!
//! ## Crate Policy
//!
//! - Depends only on `vbridge-core` internally.
//! - The schema is never mutated after construction.

pub mod attribute;
pub mod loader;
pub mod walker;

pub use attribute::{Attribute, ElementType, Nesting, Schema, ValidatorDecl, ValueKind};
pub use loader::{load_schema, schema_from_json_str, schema_from_yaml_str};
pub use walker::{visit, walk, ExpressionSource, ExpressionTable};
