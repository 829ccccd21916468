//! # vbridge-validate — Validation Bridge
//!
//! Connects a backend's whole-object validation routine to per-attribute
//! configuration diagnostics.
//!
//! ## Flow
//!
//! 1. The bridge builds its expression table once, on first use.
//! 2. If any configuration value is unknown, validation is deferred.
//! 3. Otherwise the configuration is materialized into the backend's domain
//!    object and the backend validator runs once.
//! 4. Each backend error is attributed to the attribute under validation,
//!    and mentions of related backend paths are rewritten to configuration
//!    paths.
//!
//! ## Modules
//!
//! - `bridge`: [`ValidationBridge`], the orchestrator.
//! - `reconcile`: completion, attribution, related-path rewrite.
//! - `materialize`: [`Materializer`] implementations.
//! - `store`: [`StoreValidator`] implementations, including a JSON Schema
//!   backend.
//! - `plan`: one [`ValidationRequest`] per attribute instance.
//!
//! ## Crate Policy
//!
//! - Attribution never fails: an error that does not belong to the attribute
//!   is dropped for that attribute.
//! - Materialization failures are returned, never swallowed.

pub mod bridge;
pub mod materialize;
pub mod plan;
pub mod reconcile;
pub mod store;

pub use bridge::ValidationBridge;
pub use materialize::{ConfigModel, ExpressionProjection, Materializer, SerdeModel};
pub use plan::{plan_requests, ValidationRequest};
pub use reconcile::{attribute, complete, is_related, reconcile, rewrite_related};
pub use store::{
    backend_path, pointer_to_backend_path, JsonSchemaStoreValidator, StaticStoreValidator,
    StoreValidator,
};
