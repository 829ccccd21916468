//! # Schema Loading
//!
//! Reads an attribute schema from disk. The format is chosen from the file
//! extension: `.yaml`/`.yml` for YAML, anything else is parsed as JSON.

use std::path::Path;

use vbridge_core::BridgeError;

use crate::attribute::Schema;

/// Parse a schema from YAML text.
///
/// # Errors
///
/// Returns `BridgeError::SchemaLoad` if the text is not a valid schema.
pub fn schema_from_yaml_str(content: &str, name: &str) -> Result<Schema, BridgeError> {
    serde_yaml::from_str(content).map_err(|e| BridgeError::SchemaLoad {
        name: name.to_string(),
        reason: format!("invalid YAML schema: {e}"),
    })
}

/// Parse a schema from JSON text.
///
/// # Errors
///
/// Returns `BridgeError::SchemaLoad` if the text is not a valid schema.
pub fn schema_from_json_str(content: &str, name: &str) -> Result<Schema, BridgeError> {
    serde_json::from_str(content).map_err(|e| BridgeError::SchemaLoad {
        name: name.to_string(),
        reason: format!("invalid JSON schema: {e}"),
    })
}

/// Load a schema file.
///
/// # Errors
///
/// Returns `BridgeError::SchemaLoad` if the file cannot be read or parsed.
pub fn load_schema(path: &Path) -> Result<Schema, BridgeError> {
    let name = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| BridgeError::SchemaLoad {
        name: name.clone(),
        reason: format!("cannot read file: {e}"),
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let schema = match ext {
        "yaml" | "yml" => schema_from_yaml_str(&content, &name)?,
        _ => schema_from_json_str(&content, &name)?,
    };
    tracing::debug!(schema = %name, attributes = schema.attributes.len(), "loaded attribute schema");
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::attribute::ValueKind;

    const YAML_SCHEMA: &str = r#"
attributes:
  a:
    kind: string
    validators:
      - type: store
        path_expr: spec.a
  b:
    kind: list
    element: int32
    element_validators:
      - type: store
        path_expr: "spec.b[?]"
  c:
    kind: int64
    validators:
      - type: host
        name: at_least(1)
      - type: store
        path_expr: spec.c
"#;

    #[test]
    fn test_yaml_schema_parses() {
        let schema = schema_from_yaml_str(YAML_SCHEMA, "inline").unwrap();
        assert_eq!(schema.attributes.len(), 3);
        assert!(matches!(schema.attributes["b"].kind, ValueKind::List { .. }));
        assert!(matches!(schema.attributes["c"].kind, ValueKind::Int64 { .. }));
        assert_eq!(schema.attributes["c"].store_expr().unwrap().as_str(), "spec.c");
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let err = schema_from_yaml_str("attributes:\n  a:\n    kind: tuple\n", "bad").unwrap_err();
        assert!(matches!(err, BridgeError::SchemaLoad { .. }));
    }

    #[test]
    fn test_load_schema_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(YAML_SCHEMA.as_bytes()).unwrap();
        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema.attributes.len(), 3);

        let mut json = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        json.write_all(br#"{"attributes": {"x": {"kind": "bool"}}}"#).unwrap();
        let schema = load_schema(json.path()).unwrap();
        assert!(schema.get("x").is_some());
    }

    #[test]
    fn test_missing_file() {
        let err = load_schema(Path::new("/nonexistent/schema.yaml")).unwrap_err();
        match err {
            BridgeError::SchemaLoad { reason, .. } => assert!(reason.contains("cannot read file")),
            other => panic!("Expected SchemaLoad, got: {other}"),
        }
    }
}
