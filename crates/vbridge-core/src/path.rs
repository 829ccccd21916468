//! # Paths: Backend Expressions and Concrete Configuration Paths
//!
//! Two path languages meet in the bridge:
//!
//! - **`PathExpr`** is the backend's view: dot-separated field names with
//!   `?` standing for "the index or key at this nesting level", e.g.
//!   `spec.types[?].locations[?]`. Authored once per schema attribute.
//!
//! - **`ConcretePath`** is the configuration's view: a sequence of
//!   attribute, index, and key steps, e.g. `types[2].locations[0]`.
//!
//! Declaration-site paths recorded by the schema walker use two extra
//! markers, `AnyElement` for set members and `AnyKey` for map entries,
//! because no runtime element exists when the schema is walked.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Wildcard character inside a path expression.
pub const WILDCARD: char = '?';

/// A backend-side path expression with `?` wildcards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathExpr(String);

impl PathExpr {
    /// Wrap an expression string. No validation is performed; malformed
    /// expressions simply never match anything.
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// The raw expression text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of `?` wildcards in the expression.
    pub fn wildcard_count(&self) -> usize {
        self.0.matches(WILDCARD).count()
    }

    /// Returns true if the expression contains at least one wildcard.
    pub fn has_wildcard(&self) -> bool {
        self.0.contains(WILDCARD)
    }

    /// The expression text up to and including the character before the
    /// last wildcard, or `None` when there is no wildcard.
    ///
    /// `spec.types[?].locations[?]` yields `spec.types[?].locations[`.
    pub fn wildcard_prefix(&self) -> Option<&str> {
        self.0.rfind(WILDCARD).map(|idx| &self.0[..idx])
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathExpr {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PathExpr {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// One step of a concrete configuration path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// A named attribute.
    Attribute(String),
    /// A list (or positional set) element.
    Index(usize),
    /// A map entry.
    Key(String),
    /// Any member of a set. Only appears at declaration sites.
    AnyElement,
    /// Any entry of a map. Only appears at declaration sites.
    AnyKey,
}

impl PathStep {
    /// Steps whose value varies between instances of the same attribute.
    /// These are the steps that fill `?` wildcards.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, PathStep::Index(_) | PathStep::Key(_))
    }

    /// Steps that occupy a structurally-variable slot, whether or not a
    /// concrete value is known for it.
    pub fn is_slot(&self) -> bool {
        !matches!(self, PathStep::Attribute(_))
    }

    /// Literal text of a dynamic step as it appears in a completed path
    /// expression: decimal for indices, verbatim for keys.
    pub fn literal(&self) -> Option<String> {
        match self {
            PathStep::Index(i) => Some(i.to_string()),
            PathStep::Key(k) => Some(k.clone()),
            _ => None,
        }
    }
}

/// A configuration-side path made of attribute, index, and key steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ConcretePath {
    steps: Vec<PathStep>,
}

impl ConcretePath {
    /// The empty path, addressing the configuration root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from a list of steps.
    pub fn from_steps(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }

    /// Shorthand for a single top-level attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::root().at_attribute(name)
    }

    /// Extend with a named attribute step.
    pub fn at_attribute(mut self, name: impl Into<String>) -> Self {
        self.steps.push(PathStep::Attribute(name.into()));
        self
    }

    /// Extend with a list index step.
    pub fn at_index(mut self, index: usize) -> Self {
        self.steps.push(PathStep::Index(index));
        self
    }

    /// Extend with a map key step.
    pub fn at_key(mut self, key: impl Into<String>) -> Self {
        self.steps.push(PathStep::Key(key.into()));
        self
    }

    /// Extend with a set wildcard step.
    pub fn at_any_element(mut self) -> Self {
        self.steps.push(PathStep::AnyElement);
        self
    }

    /// Extend with a map wildcard step.
    pub fn at_any_key(mut self) -> Self {
        self.steps.push(PathStep::AnyKey);
        self
    }

    /// Extend with an arbitrary step.
    pub fn with_step(mut self, step: PathStep) -> Self {
        self.steps.push(step);
        self
    }

    /// All steps in order.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true for the root path.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The index and key steps, in declaration order.
    pub fn dynamic_steps(&self) -> Vec<&PathStep> {
        self.steps.iter().filter(|s| s.is_dynamic()).collect()
    }

    /// Fill slot steps positionally from `dynamic`.
    ///
    /// Attribute steps are kept verbatim. Each slot step (index, key, or a
    /// wildcard marker) takes the next dynamic step if one is left and is
    /// kept as declared otherwise.
    pub fn fill_slots(&self, dynamic: &[&PathStep]) -> ConcretePath {
        let mut remaining = dynamic.iter();
        let steps = self
            .steps
            .iter()
            .map(|step| {
                if step.is_slot() {
                    if let Some(next) = remaining.next() {
                        return (*next).clone();
                    }
                }
                step.clone()
            })
            .collect();
        ConcretePath { steps }
    }
}

impl fmt::Display for ConcretePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Attribute(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                PathStep::Index(idx) => write!(f, "[{idx}]")?,
                PathStep::Key(key) => write!(f, "[{key:?}]")?,
                PathStep::AnyElement => f.write_str("[*]")?,
                PathStep::AnyKey => f.write_str("[\"*\"]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for ConcretePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
