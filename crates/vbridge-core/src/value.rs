//! # Configuration Values
//!
//! The attribute tree a user supplies, with explicit known/unknown state.
//!
//! A value is *unknown* when the host cannot resolve it yet (it depends on
//! another resource that has not been created). The bridge refuses to
//! materialize a tree that contains any unknown value; validation is
//! deferred instead.
//!
//! JSON documents mark unknown values with a placeholder string (see
//! [`BridgeOptions::unknown_marker`](crate::BridgeOptions)).

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{Map, Number, Value};

use crate::error::BridgeError;
use crate::path::{ConcretePath, PathStep};

/// A node of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// Explicitly absent.
    Null,
    /// Not resolved yet.
    Unknown,
    /// Boolean.
    Bool(bool),
    /// Integer or float.
    Number(Number),
    /// String.
    String(String),
    /// List or set; element order is the order the host supplied.
    List(Vec<ConfigValue>),
    /// Nested object or map, keyed by attribute name or map key.
    Object(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Convert a JSON document into a configuration tree.
    ///
    /// Strings equal to `unknown_marker` become [`ConfigValue::Unknown`].
    /// Arrays become lists and objects become objects. Whether an object is
    /// a nested attribute block or a map is decided by the schema.
    pub fn from_json(value: &Value, unknown_marker: &str) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(*b),
            Value::Number(n) => ConfigValue::Number(n.clone()),
            Value::String(s) if s == unknown_marker => ConfigValue::Unknown,
            Value::String(s) => ConfigValue::String(s.clone()),
            Value::Array(items) => ConfigValue::List(
                items
                    .iter()
                    .map(|v| Self::from_json(v, unknown_marker))
                    .collect(),
            ),
            Value::Object(map) => ConfigValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v, unknown_marker)))
                    .collect(),
            ),
        }
    }

    /// Convert the tree into JSON for materialization.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Materialization` if any value is unknown.
    pub fn to_json(&self) -> Result<Value, BridgeError> {
        self.to_json_at(&ConcretePath::root())
    }

    fn to_json_at(&self, at: &ConcretePath) -> Result<Value, BridgeError> {
        Ok(match self {
            ConfigValue::Null => Value::Null,
            ConfigValue::Unknown => {
                return Err(BridgeError::Materialization {
                    path: at.to_string(),
                    reason: "value is not known yet".to_string(),
                })
            }
            ConfigValue::Bool(b) => Value::Bool(*b),
            ConfigValue::Number(n) => Value::Number(n.clone()),
            ConfigValue::String(s) => Value::String(s.clone()),
            ConfigValue::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(item.to_json_at(&at.clone().at_index(i))?);
                }
                Value::Array(out)
            }
            ConfigValue::Object(attrs) => {
                let mut out = Map::new();
                for (k, v) in attrs {
                    out.insert(k.clone(), v.to_json_at(&at.clone().at_attribute(k.clone()))?);
                }
                Value::Object(out)
            }
        })
    }

    /// Returns true if this is [`ConfigValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Returns true if this is [`ConfigValue::Unknown`].
    pub fn is_unknown(&self) -> bool {
        matches!(self, ConfigValue::Unknown)
    }

    /// Returns true if no value anywhere in this subtree is unknown.
    pub fn is_fully_known(&self) -> bool {
        match self {
            ConfigValue::Unknown => false,
            ConfigValue::List(items) => items.iter().all(ConfigValue::is_fully_known),
            ConfigValue::Object(entries) => entries.values().all(ConfigValue::is_fully_known),
            _ => true,
        }
    }

    /// Look up a child by one path step.
    ///
    /// Attribute and key steps match objects. Index steps match lists.
    /// Wildcard markers never match.
    pub fn child(&self, step: &PathStep) -> Option<&ConfigValue> {
        match (self, step) {
            (ConfigValue::Object(m), PathStep::Attribute(name) | PathStep::Key(name)) => {
                m.get(name)
            }
            (ConfigValue::List(items), PathStep::Index(i)) => items.get(*i),
            _ => None,
        }
    }

    /// Resolve a full concrete path from this node.
    pub fn get(&self, path: &ConcretePath) -> Option<&ConfigValue> {
        path.steps()
            .iter()
            .try_fold(self, |node, step| node.child(step))
    }

    /// Elements of a list, or `None` for any other node.
    pub fn elements(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of an object, or `None` for any other node.
    pub fn entries(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => f.write_str("<null>"),
            ConfigValue::Unknown => f.write_str("<unknown>"),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::String(s) => write!(f, "{s:?}"),
            ConfigValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            ConfigValue::Object(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Read access to the configuration tree under validation.
///
/// The bridge only needs to know whether the whole tree is resolved and to
/// obtain its JSON view for materialization.
pub trait ConfigStore {
    /// The root of the configuration tree.
    fn root(&self) -> &ConfigValue;

    /// Returns true if no value in the tree is unknown.
    fn is_fully_known(&self) -> bool {
        self.root().is_fully_known()
    }

    /// JSON view of the whole tree.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Materialization` if the tree contains unknown values.
    fn to_json(&self) -> Result<Value, BridgeError> {
        self.root().to_json()
    }

    /// Value at `path`, if present.
    fn get(&self, path: &ConcretePath) -> Option<&ConfigValue> {
        self.root().get(path)
    }
}

impl ConfigStore for ConfigValue {
    fn root(&self) -> &ConfigValue {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MARKER: &str = "(known after apply)";

    #[test]
    fn test_from_json_marks_unknown() {
        let tree = ConfigValue::from_json(&json!({"a": "x", "b": [1, "(known after apply)"]}), MARKER);
        assert!(!tree.is_fully_known());
        let b1 = tree.get(&ConcretePath::attribute("b").at_index(1)).unwrap();
        assert!(b1.is_unknown());
    }

    #[test]
    fn test_fully_known_tree_round_trips_to_json() {
        let doc = json!({"a": "x", "b": [1, 2], "c": {"d": true}});
        let tree = ConfigValue::from_json(&doc, MARKER);
        assert!(tree.is_fully_known());
        assert_eq!(tree.to_json().unwrap(), doc);
    }

    #[test]
    fn test_to_json_rejects_unknown_with_path() {
        let tree = ConfigValue::from_json(&json!({"types": [{"name": MARKER}]}), MARKER);
        let err = tree.to_json().unwrap_err();
        match err {
            BridgeError::Materialization { path, .. } => assert_eq!(path, "types[0].name"),
            other => panic!("Expected Materialization, got: {other}"),
        }
    }

    #[test]
    fn test_get_through_map_keys() {
        let tree = ConfigValue::from_json(&json!({"labels": {"env": "prod", "3": "x"}}), MARKER);
        assert_eq!(
            tree.get(&ConcretePath::attribute("labels").at_key("3")),
            Some(&ConfigValue::String("x".into()))
        );

        let path = ConcretePath::attribute("labels").at_key("env");
        assert_eq!(tree.get(&path), Some(&ConfigValue::String("prod".into())));
        assert_eq!(tree.get(&ConcretePath::attribute("labels").at_any_key()), None);
    }

    #[test]
    fn test_display_values() {
        let tree = ConfigValue::from_json(&json!({"n": 3, "s": "x", "l": [true, null]}), MARKER);
        assert_eq!(tree.to_string(), r#"{"l": [true, <null>], "n": 3, "s": "x"}"#);
        assert_eq!(ConfigValue::Unknown.to_string(), "<unknown>");
    }

    #[test]
    fn test_store_defaults_delegate_to_root() {
        let tree = ConfigValue::from_json(&json!({"a": 1}), MARKER);
        let store: &dyn ConfigStore = &tree;
        assert!(store.is_fully_known());
        assert_eq!(store.to_json().unwrap(), json!({"a": 1}));
    }
}
