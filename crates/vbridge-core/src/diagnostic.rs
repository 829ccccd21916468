//! # Diagnostics
//!
//! What the bridge hands back to the host: one entry per backend error that
//! was attributed to the attribute under validation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::ConcretePath;

/// Diagnostic severity.
///
/// Bridge diagnostics use the severity configured in
/// [`BridgeOptions::severity`](crate::BridgeOptions); hosts that only want
/// advisory output set it to `warning`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the plan.
    #[default]
    Error,
    /// Informational; the plan proceeds.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A single diagnostic attached to a configuration attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Diagnostic {
    /// Concrete configuration path the diagnostic belongs to.
    pub path: ConcretePath,
    /// Severity.
    pub severity: Severity,
    /// Short summary line.
    pub summary: String,
    /// Backend explanation with the path prefix stripped and
    /// cross-references rewritten to configuration paths.
    pub detail: String,
    /// Display form of the offending value.
    pub value: String,
}

impl Diagnostic {
    pub fn new(
        path: ConcretePath,
        severity: Severity,
        summary: impl Into<String>,
        detail: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            path,
            severity,
            summary: summary.into(),
            detail: detail.into(),
            value: value.into(),
        }
    }

    /// Build an error-severity diagnostic.
    pub fn error(
        path: ConcretePath,
        summary: impl Into<String>,
        detail: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(path, Severity::Error, summary, detail, value)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}: {}: {} (value: {})",
            self.severity, self.path, self.summary, self.detail, self.value
        )
    }
}

/// Ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// An empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Append every diagnostic from `other`.
    pub fn append(&mut self, other: Diagnostics) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns the number of diagnostics.
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true if there are no diagnostics.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns true if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Iterate diagnostics in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns a slice of all diagnostics.
    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{d}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Diagnostic {
        Diagnostic::error(
            ConcretePath::attribute("b").at_index(0),
            "Invalid attribute value",
            "should be better than spec.c",
            "1",
        )
    }

    #[test]
    fn test_diagnostic_display_format() {
        assert_eq!(
            sample().to_string(),
            "error: b[0]: Invalid attribute value: should be better than spec.c (value: 1)"
        );
    }

    #[test]
    fn test_collection_display_one_per_line() {
        let diags = Diagnostics::from(vec![sample(), sample()]);
        assert_eq!(diags.to_string().lines().count(), 2);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_serialize_path_as_string() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["path"], "b[0]");
        assert_eq!(value["severity"], "error");
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let warning = Diagnostic::new(
            ConcretePath::attribute("c"),
            Severity::Warning,
            "Invalid attribute value",
            "must be at least 1",
            "0",
        );
        assert!(warning.to_string().starts_with("warning: c: "));
        let diags = Diagnostics::from(vec![warning]);
        assert!(!diags.is_empty());
        assert!(!diags.has_errors());
    }

    #[test]
    fn test_severity_deserializes_lowercase() {
        let s: Severity = serde_json::from_value(serde_json::json!("warning")).unwrap();
        assert_eq!(s, Severity::Warning);
        assert_eq!(Severity::default(), Severity::Error);
    }
}
