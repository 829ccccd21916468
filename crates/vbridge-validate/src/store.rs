//! # Store Validators
//!
//! The backend validation routine is a black box: it receives the fully
//! materialized domain object and returns free-text errors shaped
//! `field <backend-path> <explanation>`.
//!
//! [`JsonSchemaStoreValidator`] is a concrete backend built on the
//! `jsonschema` crate (Draft 2020-12). Each violation's JSON Pointer
//! instance path is converted to the dotted backend syntax, so
//! `/spec/types/2/locations/0` is reported as `spec.types[2].locations[0]`.
//! Map entries reached through `additionalProperties` are bracketed:
//! `/metadata/labels/env` is reported as `metadata.labels[env]`.

use std::path::Path;

use jsonschema::{Draft, Validator};
use serde_json::Value;
use vbridge_core::options::DEFAULT_FIELD_PREFIX;
use vbridge_core::BridgeError;

/// Backend validator over a domain object of type `D`.
pub trait StoreValidator<D: ?Sized>: Send + Sync {
    /// Validate the whole object, returning one string per violation.
    fn validate(&self, object: &D) -> Vec<String>;
}

impl<D: ?Sized, F> StoreValidator<D> for F
where
    F: Fn(&D) -> Vec<String> + Send + Sync,
{
    fn validate(&self, object: &D) -> Vec<String> {
        self(object)
    }
}

/// A validator that always reports the same errors, whatever the object.
#[derive(Debug, Clone, Default)]
pub struct StaticStoreValidator {
    errors: Vec<String>,
}

impl StaticStoreValidator {
    pub fn new<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }
}

impl<D: ?Sized> StoreValidator<D> for StaticStoreValidator {
    fn validate(&self, _object: &D) -> Vec<String> {
        self.errors.clone()
    }
}

/// Backend validator that checks the domain object against a JSON Schema.
pub struct JsonSchemaStoreValidator {
    validator: Validator,
    field_prefix: String,
}

impl std::fmt::Debug for JsonSchemaStoreValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaStoreValidator")
            .field("field_prefix", &self.field_prefix)
            .finish_non_exhaustive()
    }
}

impl JsonSchemaStoreValidator {
    /// Compile `schema` into a validator.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::ValidatorBuild` if the schema is invalid.
    pub fn new(schema: &Value) -> Result<Self, BridgeError> {
        let mut opts = jsonschema::options();
        opts.with_draft(Draft::Draft202012);
        let validator = opts.build(schema).map_err(|e| BridgeError::ValidatorBuild {
            reason: e.to_string(),
        })?;
        Ok(Self {
            validator,
            field_prefix: DEFAULT_FIELD_PREFIX.to_string(),
        })
    }

    /// Load and compile a JSON Schema file.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::DocumentLoad` if the file cannot be read or is
    /// not JSON, and `BridgeError::ValidatorBuild` if it is not a valid schema.
    pub fn from_file(path: &Path) -> Result<Self, BridgeError> {
        let content = std::fs::read_to_string(path).map_err(|e| BridgeError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        let schema: Value = serde_json::from_str(&content).map_err(|e| BridgeError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("invalid JSON: {e}"),
        })?;
        Self::new(&schema)
    }

    /// Override the text written before each backend path.
    pub fn with_field_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.field_prefix = prefix.into();
        self
    }
}

impl StoreValidator<Value> for JsonSchemaStoreValidator {
    fn validate(&self, object: &Value) -> Vec<String> {
        self.validator
            .iter_errors(object)
            .map(|e| {
                let instance = e.instance_path.to_string();
                let path = backend_path(&instance, &e.schema_path.to_string());
                format!("{}{} {}", self.field_prefix, path, e)
            })
            .collect()
    }
}

/// How an instance location was reached from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Field,
    Index,
    Key,
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|raw| raw.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Classify each instance segment by the schema keyword that descended into
/// it: `properties` names a field, `additionalProperties` and
/// `patternProperties` reach map entries, the item keywords reach indices.
fn classify(instance: &[String], keywords: &[String]) -> Vec<Access> {
    let mut access = Vec::with_capacity(instance.len());
    let mut k = 0;
    while access.len() < instance.len() && k < keywords.len() {
        match keywords[k].as_str() {
            "properties" => {
                access.push(Access::Field);
                k += 2;
            }
            "patternProperties" => {
                access.push(Access::Key);
                k += 2;
            }
            "additionalProperties" | "unevaluatedProperties" => {
                access.push(Access::Key);
                k += 1;
            }
            "prefixItems" => {
                access.push(Access::Index);
                k += 2;
            }
            "items" | "additionalItems" | "unevaluatedItems" | "contains" => {
                access.push(Access::Index);
                k += 1;
            }
            "allOf" | "anyOf" | "oneOf" | "$defs" | "definitions" | "dependentSchemas" => k += 2,
            _ => k += 1,
        }
    }
    access
}

/// Render a violation's location in backend path syntax.
///
/// `instance_pointer` is the JSON Pointer of the failing value and
/// `schema_pointer` the keyword location that rejected it. Fields render
/// dotted (`spec.name`); array indices and map entries render bracketed
/// (`spec.b[0]`, `metadata.labels[env]`), so a map key reads the same way a
/// completed path expression writes it. Segments the schema location does not
/// explain fall back to their text: all digits is an index, anything else a
/// field. The empty pointer is `(root)`.
pub fn backend_path(instance_pointer: &str, schema_pointer: &str) -> String {
    let instance = pointer_segments(instance_pointer);
    let access = classify(&instance, &pointer_segments(schema_pointer));

    let mut path = String::new();
    for (i, segment) in instance.iter().enumerate() {
        let kind = access.get(i).copied().unwrap_or_else(|| {
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                Access::Index
            } else {
                Access::Field
            }
        });
        match kind {
            Access::Index | Access::Key => {
                path.push('[');
                path.push_str(segment);
                path.push(']');
            }
            Access::Field => {
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(segment);
            }
        }
    }
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path
    }
}

/// Convert a JSON Pointer (`/spec/b/0`) into backend path syntax (`spec.b[0]`)
/// without schema context: all-digit segments become indices.
pub fn pointer_to_backend_path(pointer: &str) -> String {
    backend_path(pointer, "")
}
