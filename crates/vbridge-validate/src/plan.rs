//! # Request Planning
//!
//! Walks the schema and a configuration tree together and produces one
//! validation request per attribute instance that carries a store path
//! expression. List and set elements are addressed by position and map
//! entries by key, so every request path is fully concrete.

use std::collections::BTreeMap;

use vbridge_core::{ConcretePath, ConfigValue, PathExpr, PathStep};
use vbridge_schema::{Attribute, Nesting, Schema};

/// One attribute under validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    /// The attribute's backend path expression.
    pub path_expr: PathExpr,
    /// Concrete configuration path of this instance.
    pub path: ConcretePath,
    /// Current value, shown in diagnostics.
    pub value: ConfigValue,
}

impl ValidationRequest {
    pub fn new(path_expr: impl Into<PathExpr>, path: ConcretePath, value: ConfigValue) -> Self {
        Self {
            path_expr: path_expr.into(),
            path,
            value,
        }
    }
}

/// Whether an instance is the attribute itself or one of its elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Level {
    Attribute,
    Element,
}

/// Visit every attribute instance present in `config`, pre-order.
pub(crate) fn visit_instances<F>(schema: &Schema, config: &ConfigValue, visitor: &mut F)
where
    F: FnMut(&ConcretePath, &Attribute, &ConfigValue, Level),
{
    visit_level(&schema.attributes, config, &ConcretePath::root(), visitor);
}

fn visit_level<F>(
    attributes: &BTreeMap<String, Attribute>,
    node: &ConfigValue,
    base: &ConcretePath,
    visitor: &mut F,
) where
    F: FnMut(&ConcretePath, &Attribute, &ConfigValue, Level),
{
    for (name, attribute) in attributes {
        let Some(value) = node.child(&PathStep::Attribute(name.clone())) else {
            continue;
        };
        let path = base.clone().at_attribute(name.clone());
        visitor(&path, attribute, value, Level::Attribute);

        if attribute.kind.element_step().is_some() {
            for (step, element) in members(value) {
                visitor(&path.clone().with_step(step), attribute, element, Level::Element);
            }
        }

        if let Some((nesting, children)) = attribute.kind.nested() {
            match nesting {
                Nesting::Single => visit_level(children, value, &path, visitor),
                Nesting::List | Nesting::Set | Nesting::Map => {
                    for (step, element) in members(value) {
                        visit_level(children, element, &path.clone().with_step(step), visitor);
                    }
                }
            }
        }
    }
}

/// Elements of a collection value with the step that addresses each.
fn members(value: &ConfigValue) -> Vec<(PathStep, &ConfigValue)> {
    if let Some(items) = value.elements() {
        return items
            .iter()
            .enumerate()
            .map(|(i, item)| (PathStep::Index(i), item))
            .collect();
    }
    if let Some(entries) = value.entries() {
        return entries
            .iter()
            .map(|(k, v)| (PathStep::Key(k.clone()), v))
            .collect();
    }
    Vec::new()
}

/// Plan one request per attribute instance carrying a store path expression.
pub fn plan_requests(schema: &Schema, config: &ConfigValue) -> Vec<ValidationRequest> {
    let mut requests = Vec::new();
    visit_instances(schema, config, &mut |path, attribute, value, level| {
        let expr = match level {
            Level::Attribute => attribute.store_expr(),
            Level::Element => attribute.element_store_expr(),
        };
        if let Some(expr) = expr {
            requests.push(ValidationRequest::new(expr.clone(), path.clone(), value.clone()));
        }
    });
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vbridge_schema::ElementType;

    const MARKER: &str = "(known after apply)";

    fn schema() -> Schema {
        Schema::new()
            .with_attribute("a", Attribute::string().with_store("spec.a"))
            .with_attribute(
                "b",
                Attribute::list(ElementType::Int32).with_element_store("spec.b[?]"),
            )
            .with_attribute(
                "types",
                Attribute::object(
                    Nesting::List,
                    Schema::new()
                        .with_attribute("name", Attribute::string().with_store("spec.types[?].name")),
                ),
            )
            .with_attribute(
                "labels",
                Attribute::map(ElementType::String).with_element_store("metadata.labels[?]"),
            )
    }

    #[test]
    fn test_plan_expands_elements_and_objects() {
        let config = ConfigValue::from_json(
            &json!({
                "a": "x",
                "b": [1, 2],
                "types": [{"name": "t0"}, {"name": "t1"}],
                "labels": {"env": "prod"}
            }),
            MARKER,
        );
        let planned: Vec<String> = plan_requests(&schema(), &config)
            .iter()
            .map(|r| format!("{} {}", r.path, r.path_expr))
            .collect();
        assert_eq!(
            planned,
            vec![
                "a spec.a",
                "b[0] spec.b[?]",
                "b[1] spec.b[?]",
                "labels[\"env\"] metadata.labels[?]",
                "types[0].name spec.types[?].name",
                "types[1].name spec.types[?].name",
            ]
        );
    }

    #[test]
    fn test_plan_skips_absent_attributes() {
        let config = ConfigValue::from_json(&json!({"a": "x"}), MARKER);
        let requests = plan_requests(&schema(), &config);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].value, ConfigValue::String("x".into()));
    }

    #[test]
    fn test_plan_carries_unknown_values() {
        let config = ConfigValue::from_json(&json!({"b": [MARKER]}), MARKER);
        let requests = plan_requests(&schema(), &config);
        assert_eq!(requests.len(), 1);
        assert!(requests[0].value.is_unknown());
    }
}
