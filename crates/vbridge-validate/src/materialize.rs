//! # Materialization
//!
//! Turns the whole configuration tree into the domain object the backend
//! validator understands.
//!
//! - [`SerdeModel`] deserializes the configuration into a typed
//!   configuration model and converts that into the domain object.
//! - [`ExpressionProjection`] needs no model type: it builds a JSON domain
//!   object by writing every value at its completed path expression.
//!
//! A configuration that does not fit is a wiring defect between the schema
//! and the domain model, reported as `BridgeError::ModelMismatch`.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use vbridge_core::{BridgeError, ConcretePath, ConfigStore, ConfigValue, PathExpr, PathStep};
use vbridge_schema::{Attribute, Schema, ValueKind};

use crate::plan::{visit_instances, Level};

/// Builds the domain object `D` from a configuration store.
pub trait Materializer<D>: Send + Sync {
    /// Materialize the full configuration.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ModelMismatch` or `BridgeError::Materialization`
    /// if the configuration cannot be converted.
    fn materialize(&self, config: &dyn ConfigStore) -> Result<D, BridgeError>;
}

/// A typed configuration model that knows how to become a domain object.
pub trait ConfigModel: DeserializeOwned {
    /// The backend's domain object type.
    type Domain;

    /// Convert the configuration model into the domain object.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ModelMismatch` if the model cannot be expressed
    /// as a domain object.
    fn to_domain(&self) -> Result<Self::Domain, BridgeError>;
}

/// Materializer for a serde-deserializable configuration model.
pub struct SerdeModel<M> {
    _model: PhantomData<fn() -> M>,
}

impl<M> SerdeModel<M> {
    pub fn new() -> Self {
        Self {
            _model: PhantomData,
        }
    }
}

impl<M> Default for SerdeModel<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ConfigModel> Materializer<M::Domain> for SerdeModel<M> {
    fn materialize(&self, config: &dyn ConfigStore) -> Result<M::Domain, BridgeError> {
        let raw = config.to_json()?;
        let model: M = serde_json::from_value(raw).map_err(|e| BridgeError::ModelMismatch {
            model: std::any::type_name::<M>().to_string(),
            reason: e.to_string(),
        })?;
        model.to_domain()
    }
}

/// Builds a JSON domain object by placing each attribute value at the
/// completed form of its store path expression.
///
/// Object attributes are containers and are never written themselves; their
/// children place their own values. Null values are omitted.
#[derive(Debug, Clone)]
pub struct ExpressionProjection {
    schema: Arc<Schema>,
}

impl ExpressionProjection {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }
}

impl Materializer<Value> for ExpressionProjection {
    fn materialize(&self, config: &dyn ConfigStore) -> Result<Value, BridgeError> {
        let mut domain = Value::Object(Map::new());
        let mut failure = None;

        visit_instances(&self.schema, config.root(), &mut |path, attribute, value, level| {
            if failure.is_none() {
                if let Err(e) = project(&mut domain, path, attribute, value, level) {
                    failure = Some(e);
                }
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(domain),
        }
    }
}

fn mismatch(reason: String) -> BridgeError {
    BridgeError::ModelMismatch {
        model: "expression projection".to_string(),
        reason,
    }
}

/// Type-check one attribute instance and write it into `domain`.
fn project(
    domain: &mut Value,
    path: &ConcretePath,
    attribute: &Attribute,
    value: &ConfigValue,
    level: Level,
) -> Result<(), BridgeError> {
    let (fits, expected, expr) = match level {
        Level::Attribute => (
            attribute.kind.accepts(value),
            attribute.kind.name(),
            attribute.store_expr(),
        ),
        Level::Element => match attribute.kind.element_type() {
            Some(element) => (element.accepts(value), element.name(), attribute.element_store_expr()),
            None => (true, attribute.kind.name(), attribute.element_store_expr()),
        },
    };
    if !fits {
        return Err(mismatch(format!(
            "'{path}' holds {value}, which is not a valid {expected}"
        )));
    }
    if value.is_null() || matches!(attribute.kind, ValueKind::Object { .. }) {
        return Ok(());
    }
    let Some(expr) = expr else {
        return Ok(());
    };

    let segments = resolve(expr, &path.dynamic_steps())
        .map_err(|reason| mismatch(format!("{reason} at '{path}'")))?;
    place(domain, &segments, value.to_json()?)
}

/// One segment of a resolved backend path.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

/// Resolve `expr` into backend segments, filling each `?` from the next
/// dynamic step. Indices fill array positions and keys fill object fields,
/// whatever their text. Literal bracketed numbers are indices; any other
/// bracketed text is a field.
fn resolve(expr: &PathExpr, dynamic: &[&PathStep]) -> Result<Vec<Segment>, String> {
    let mut fills = dynamic.iter().filter(|step| step.is_dynamic());
    let mut fill = move || match fills.next() {
        Some(PathStep::Index(i)) => Ok(Segment::Index(*i)),
        Some(PathStep::Key(k)) => Ok(Segment::Field(k.clone())),
        _ => Err(format!("cannot complete '{expr}'")),
    };

    let text = expr.as_str();
    let mut segments = Vec::new();
    let mut name = String::new();
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '.' => flush(&mut name, &mut segments, &mut fill)?,
            '[' => {
                flush(&mut name, &mut segments, &mut fill)?;
                let mut inner = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(format!("unterminated '[' in '{expr}'"));
                }
                let segment = if inner == "?" {
                    fill()?
                } else if let Ok(i) = inner.parse::<usize>() {
                    Segment::Index(i)
                } else {
                    Segment::Field(inner.trim_matches('"').to_string())
                };
                segments.push(segment);
            }
            _ => name.push(ch),
        }
    }
    flush(&mut name, &mut segments, &mut fill)?;
    if segments.is_empty() {
        return Err("empty path expression".to_string());
    }
    Ok(segments)
}

fn flush(
    name: &mut String,
    segments: &mut Vec<Segment>,
    fill: &mut dyn FnMut() -> Result<Segment, String>,
) -> Result<(), String> {
    match name.as_str() {
        "" => {}
        "?" => {
            name.clear();
            segments.push(fill()?);
        }
        _ => segments.push(Segment::Field(std::mem::take(name))),
    }
    Ok(())
}

/// Write `value` into `root` at `segments`, creating intermediate objects
/// and arrays as needed.
fn place(root: &mut Value, segments: &[Segment], value: Value) -> Result<(), BridgeError> {
    let mut cursor = root;
    for segment in segments {
        cursor = match segment {
            Segment::Field(name) => {
                if cursor.is_null() {
                    *cursor = Value::Object(Map::new());
                }
                match cursor {
                    Value::Object(map) => map.entry(name.clone()).or_insert(Value::Null),
                    other => {
                        return Err(mismatch(format!(
                            "field '{name}' descends into non-object value {other}"
                        )))
                    }
                }
            }
            Segment::Index(i) => {
                if cursor.is_null() {
                    *cursor = Value::Array(Vec::new());
                }
                match cursor {
                    Value::Array(items) => {
                        if items.len() <= *i {
                            items.resize(*i + 1, Value::Null);
                        }
                        &mut items[*i]
                    }
                    other => {
                        return Err(mismatch(format!(
                            "index {i} descends into non-array value {other}"
                        )))
                    }
                }
            }
        };
    }
    *cursor = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use vbridge_schema::{ElementType, Nesting};

    const MARKER: &str = "(known after apply)";

    fn field(name: &str) -> Segment {
        Segment::Field(name.to_string())
    }

    #[test]
    fn test_resolve_fills_wildcards_by_step_kind() {
        let index = PathStep::Index(2);
        let key = PathStep::Key("env".into());
        assert_eq!(
            resolve(&PathExpr::new("spec.types[?].labels[?]"), &[&index, &key]).unwrap(),
            vec![field("spec"), field("types"), Segment::Index(2), field("labels"), field("env")]
        );

        let numeric_key = PathStep::Key("3".into());
        assert_eq!(
            resolve(&PathExpr::new("metadata.labels[?]"), &[&numeric_key]).unwrap(),
            vec![field("metadata"), field("labels"), field("3")]
        );
    }

    #[test]
    fn test_resolve_literal_brackets() {
        assert_eq!(
            resolve(&PathExpr::new("spec.b[0][\"name\"]"), &[]).unwrap(),
            vec![field("spec"), field("b"), Segment::Index(0), field("name")]
        );
        assert!(resolve(&PathExpr::new("spec.b[0"), &[]).is_err());
        assert!(resolve(&PathExpr::new(""), &[]).is_err());
        assert!(resolve(&PathExpr::new("spec.b[?]"), &[]).is_err());
    }

    #[test]
    fn test_place_creates_intermediates() {
        let mut root = json!({});
        place(&mut root, &[field("spec"), field("b"), Segment::Index(2)], json!(9)).unwrap();
        place(&mut root, &[field("spec"), field("a")], json!("x")).unwrap();
        assert_eq!(root, json!({"spec": {"a": "x", "b": [null, null, 9]}}));
    }

    #[test]
    fn test_place_conflict_is_model_mismatch() {
        let mut root = json!({"spec": "flat"});
        let err = place(&mut root, &[field("spec"), field("a")], json!(1)).unwrap_err();
        assert!(matches!(err, BridgeError::ModelMismatch { .. }));
    }

    fn schema() -> Schema {
        Schema::new()
            .with_attribute("a", Attribute::string().with_store("spec.a"))
            .with_attribute(
                "b",
                Attribute::list(ElementType::Int32).with_element_store("spec.b[?]"),
            )
            .with_attribute("c", Attribute::int64().with_store("spec.c"))
            .with_attribute(
                "types",
                Attribute::object(
                    Nesting::List,
                    Schema::new()
                        .with_attribute("name", Attribute::string().with_store("spec.types[?].name"))
                        .with_attribute(
                            "labels",
                            Attribute::map(ElementType::String)
                                .with_element_store("spec.types[?].labels[?]"),
                        ),
                ),
            )
            .with_attribute("comment", Attribute::string())
    }

    #[test]
    fn test_projection_places_every_value() {
        let config = ConfigValue::from_json(
            &json!({
                "a": "x",
                "b": [3, 4],
                "c": 10,
                "comment": "not sent to the backend",
                "types": [{"name": "t0", "labels": {"env": "prod"}}]
            }),
            MARKER,
        );
        let domain = ExpressionProjection::new(Arc::new(schema()))
            .materialize(&config)
            .unwrap();
        assert_eq!(
            domain,
            json!({
                "spec": {
                    "a": "x",
                    "b": [3, 4],
                    "c": 10,
                    "types": [{"name": "t0", "labels": {"env": "prod"}}]
                }
            })
        );
    }

    #[test]
    fn test_projection_omits_nulls() {
        let config = ConfigValue::from_json(&json!({"a": null, "c": 1}), MARKER);
        let domain = ExpressionProjection::new(Arc::new(schema()))
            .materialize(&config)
            .unwrap();
        assert_eq!(domain, json!({"spec": {"c": 1}}));
    }

    #[test]
    fn test_projection_incomplete_expression_is_mismatch() {
        let schema = Schema::new().with_attribute(
            "name",
            Attribute::string().with_store("spec.types[?].name"),
        );
        let config = ConfigValue::from_json(&json!({"name": "x"}), MARKER);
        let err = ExpressionProjection::new(Arc::new(schema))
            .materialize(&config)
            .unwrap_err();
        assert!(err.is_wiring_defect());
    }

    fn labels_schema() -> Schema {
        Schema::new().with_attribute(
            "labels",
            Attribute::map(ElementType::String).with_element_store("metadata.labels[?]"),
        )
    }

    #[test]
    fn test_projection_keeps_numeric_map_keys() {
        let config = ConfigValue::from_json(&json!({"labels": {"3": "a"}}), MARKER);
        let domain = ExpressionProjection::new(Arc::new(labels_schema()))
            .materialize(&config)
            .unwrap();
        assert_eq!(domain, json!({"metadata": {"labels": {"3": "a"}}}));
    }

    #[test]
    fn test_projection_mixed_map_keys() {
        let config = ConfigValue::from_json(
            &json!({"labels": {"1": "a", "env": "b", "18446744073709551615": "c"}}),
            MARKER,
        );
        let domain = ExpressionProjection::new(Arc::new(labels_schema()))
            .materialize(&config)
            .unwrap();
        assert_eq!(
            domain,
            json!({"metadata": {"labels": {"1": "a", "env": "b", "18446744073709551615": "c"}}})
        );
    }

    #[test]
    fn test_projection_rejects_wrong_element_type() {
        let config = ConfigValue::from_json(&json!({"b": ["x"]}), MARKER);
        let err = ExpressionProjection::new(Arc::new(schema()))
            .materialize(&config)
            .unwrap_err();
        match err {
            BridgeError::ModelMismatch { reason, .. } => {
                assert!(reason.contains("b[0]"), "got: {reason}");
                assert!(reason.contains("int32"), "got: {reason}");
            }
            other => panic!("Expected ModelMismatch, got: {other}"),
        }
    }

    #[test]
    fn test_projection_rejects_wrong_attribute_shape() {
        let config = ConfigValue::from_json(&json!({"labels": ["a"]}), MARKER);
        let err = ExpressionProjection::new(Arc::new(labels_schema()))
            .materialize(&config)
            .unwrap_err();
        assert!(err.is_wiring_defect());
        assert!(err.to_string().contains("map"), "got: {err}");
    }

    #[derive(Debug, Deserialize)]
    struct EnvironmentModel {
        name: String,
        replicas: i64,
    }

    impl ConfigModel for EnvironmentModel {
        type Domain = Value;

        fn to_domain(&self) -> Result<Value, BridgeError> {
            Ok(json!({"spec": {"display_name": self.name, "replicas": self.replicas}}))
        }
    }

    #[test]
    fn test_serde_model_materializes() {
        let config = ConfigValue::from_json(&json!({"name": "dev", "replicas": 2}), MARKER);
        let domain = SerdeModel::<EnvironmentModel>::new().materialize(&config).unwrap();
        assert_eq!(domain["spec"]["display_name"], "dev");
    }

    #[test]
    fn test_serde_model_mismatch_is_fatal() {
        let config = ConfigValue::from_json(&json!({"name": "dev", "replicas": "two"}), MARKER);
        let err = SerdeModel::<EnvironmentModel>::new().materialize(&config).unwrap_err();
        match err {
            BridgeError::ModelMismatch { model, .. } => assert!(model.ends_with("EnvironmentModel")),
            other => panic!("Expected ModelMismatch, got: {other}"),
        }
    }
}
