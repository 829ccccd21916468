//! # Bridge Options
//!
//! Tunables shared by the bridge, the store validators, and the CLI.
//! Every field has a default so partial YAML files deserialize cleanly.

use serde::{Deserialize, Serialize};

use crate::diagnostic::Severity;

/// Prefix the backend puts in front of every error path.
pub const DEFAULT_FIELD_PREFIX: &str = "field ";

/// Summary attached to every diagnostic produced by the bridge.
pub const DEFAULT_SUMMARY: &str = "Invalid attribute value";

/// Placeholder string used in JSON configuration documents for values that
/// are not known yet.
pub const DEFAULT_UNKNOWN_MARKER: &str = "(known after apply)";

/// Options for a validation bridge instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeOptions {
    /// Text written before the backend path in store validator errors.
    pub field_prefix: String,
    /// Diagnostic summary line.
    pub summary: String,
    /// JSON string that stands for an unknown configuration value.
    pub unknown_marker: String,
    /// Severity given to every attributed backend error.
    pub severity: Severity,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            field_prefix: DEFAULT_FIELD_PREFIX.to_string(),
            summary: DEFAULT_SUMMARY.to_string(),
            unknown_marker: DEFAULT_UNKNOWN_MARKER.to_string(),
            severity: Severity::Error,
        }
    }
}
