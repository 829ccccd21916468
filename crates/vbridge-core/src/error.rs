//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error type used throughout the validation bridge. All errors
//! use `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - User input problems are never errors: they become diagnostics.
//! - A configuration tree that cannot be turned into the backend's domain
//!   object is a wiring defect and fails loudly with `ModelMismatch`.
//! - Load errors name the file or source they came from.

use thiserror::Error;

/// Top-level error type for the validation bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The configuration tree does not fit the configuration model.
    #[error("configuration does not match model '{model}': {reason}")]
    ModelMismatch {
        /// Name of the model the configuration was converted into.
        model: String,
        /// Why the conversion failed.
        reason: String,
    },

    /// A configuration value could not be converted into its domain form.
    #[error("cannot materialize value at '{path}': {reason}")]
    Materialization {
        /// Rendered configuration path of the offending value.
        path: String,
        /// Why the value could not be converted.
        reason: String,
    },

    /// An attribute schema could not be loaded or parsed.
    #[error("schema load error for '{name}': {reason}")]
    SchemaLoad {
        /// Schema file name or identifier.
        name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// A configuration or backend document could not be loaded or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Reason the document could not be loaded.
        reason: String,
    },

    /// A backend validator could not be built (e.g., invalid JSON Schema).
    #[error("validator build error: {reason}")]
    ValidatorBuild {
        /// Reason the validator could not be built.
        reason: String,
    },
}

impl BridgeError {
    /// Returns true for errors that indicate a defect in how the schema is
    /// wired to the domain model, as opposed to an environment problem.
    pub fn is_wiring_defect(&self) -> bool {
        matches!(
            self,
            BridgeError::ModelMismatch { .. } | BridgeError::Materialization { .. }
        )
    }
}
