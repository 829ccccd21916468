//! # Attribute Schema Model
//!
//! A schema is a tree of named attributes. Leaves are primitives or
//! collections of primitives; inner nodes are objects nested singly or as a
//! list, set, or map.
//!
//! ## Validators
//!
//! Each attribute declares zero or more validators. Only
//! [`ValidatorDecl::Store`] matters to the bridge: it names the backend path
//! expression whose errors belong to the attribute. Host validators are
//! carried so that a schema loaded from a file can describe everything the
//! provider declares, but the bridge never runs them.
//!
//! ## Serialized Form
//!
//! ```yaml
//! attributes:
//!   b:
//!     kind: list
//!     element: int32
//!     element_validators:
//!       - type: store
//!         path_expr: "spec.b[?]"
//!   types:
//!     kind: object
//!     nesting: list
//!     attributes:
//!       name:
//!         kind: string
//!         validators:
//!           - type: store
//!             path_expr: "spec.types[?].name"
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vbridge_core::{ConfigValue, PathExpr, PathStep};

/// A validator declared on an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ValidatorDecl {
    /// Validate through the backend store validator; errors reported at
    /// `path_expr` are attributed to this attribute.
    Store {
        /// Backend path expression for this attribute.
        path_expr: PathExpr,
    },
    /// A validator implemented by the host. Ignored by the bridge.
    Host {
        /// Name of the host validator.
        name: String,
    },
}

impl ValidatorDecl {
    /// Shorthand for a store validator.
    pub fn store(path_expr: impl Into<PathExpr>) -> Self {
        ValidatorDecl::Store {
            path_expr: path_expr.into(),
        }
    }

    /// The path expression this validator carries, if any.
    pub fn path_expr(&self) -> Option<&PathExpr> {
        match self {
            ValidatorDecl::Store { path_expr } => Some(path_expr),
            ValidatorDecl::Host { .. } => None,
        }
    }
}

/// Primitive element type of a scalar collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Dynamic,
}

impl ElementType {
    /// Lowercase type name, as used in the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::String => "string",
            ElementType::Dynamic => "dynamic",
        }
    }

    /// Returns true if `value` is a value of this type. Null and unknown
    /// values are accepted by every type.
    pub fn accepts(self, value: &ConfigValue) -> bool {
        match (self, value) {
            (_, ConfigValue::Null | ConfigValue::Unknown) | (ElementType::Dynamic, _) => true,
            (ElementType::Bool, ConfigValue::Bool(_)) => true,
            (ElementType::Int32, ConfigValue::Number(n)) => {
                n.as_i64().is_some_and(|i| i32::try_from(i).is_ok())
            }
            (ElementType::Int64, ConfigValue::Number(n)) => n.as_i64().is_some(),
            (ElementType::Float32 | ElementType::Float64, ConfigValue::Number(_)) => true,
            (ElementType::String, ConfigValue::String(_)) => true,
            _ => false,
        }
    }
}

/// How a nested object repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nesting {
    /// One object.
    Single,
    /// Ordered list of objects.
    List,
    /// Unordered set of objects.
    Set,
    /// Objects keyed by string.
    Map,
}

impl Nesting {
    /// Representative step appended when descending into this container.
    pub fn step(self) -> Option<PathStep> {
        match self {
            Nesting::Single => None,
            Nesting::List => Some(PathStep::Index(0)),
            Nesting::Set => Some(PathStep::AnyElement),
            Nesting::Map => Some(PathStep::AnyKey),
        }
    }
}

/// The closed set of attribute value kinds, each with its validator list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueKind {
    Bool {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
    Int32 {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
    Int64 {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
    Float32 {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
    Float64 {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
    String {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
    Dynamic {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
    List {
        element: ElementType,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        element_validators: Vec<ValidatorDecl>,
    },
    Set {
        element: ElementType,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        element_validators: Vec<ValidatorDecl>,
    },
    Map {
        element: ElementType,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        element_validators: Vec<ValidatorDecl>,
    },
    Object {
        nesting: Nesting,
        attributes: BTreeMap<String, Attribute>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        validators: Vec<ValidatorDecl>,
    },
}

impl ValueKind {
    /// Attribute-level validators for any kind.
    pub fn validators(&self) -> &[ValidatorDecl] {
        match self {
            ValueKind::Bool { validators }
            | ValueKind::Int32 { validators }
            | ValueKind::Int64 { validators }
            | ValueKind::Float32 { validators }
            | ValueKind::Float64 { validators }
            | ValueKind::String { validators }
            | ValueKind::Dynamic { validators }
            | ValueKind::List { validators, .. }
            | ValueKind::Set { validators, .. }
            | ValueKind::Map { validators, .. }
            | ValueKind::Object { validators, .. } => validators,
        }
    }

    fn validators_mut(&mut self) -> &mut Vec<ValidatorDecl> {
        match self {
            ValueKind::Bool { validators }
            | ValueKind::Int32 { validators }
            | ValueKind::Int64 { validators }
            | ValueKind::Float32 { validators }
            | ValueKind::Float64 { validators }
            | ValueKind::String { validators }
            | ValueKind::Dynamic { validators }
            | ValueKind::List { validators, .. }
            | ValueKind::Set { validators, .. }
            | ValueKind::Map { validators, .. }
            | ValueKind::Object { validators, .. } => validators,
        }
    }

    /// Per-element validators of a scalar collection; empty for other kinds.
    pub fn element_validators(&self) -> &[ValidatorDecl] {
        match self {
            ValueKind::List {
                element_validators, ..
            }
            | ValueKind::Set {
                element_validators, ..
            }
            | ValueKind::Map {
                element_validators, ..
            } => element_validators,
            _ => &[],
        }
    }

    /// Representative step for the elements of a scalar collection.
    pub fn element_step(&self) -> Option<PathStep> {
        match self {
            ValueKind::List { .. } => Some(PathStep::Index(0)),
            ValueKind::Set { .. } => Some(PathStep::AnyElement),
            ValueKind::Map { .. } => Some(PathStep::AnyKey),
            _ => None,
        }
    }

    /// Nesting mode and child attributes of an object kind.
    pub fn nested(&self) -> Option<(Nesting, &BTreeMap<String, Attribute>)> {
        match self {
            ValueKind::Object {
                nesting,
                attributes,
                ..
            } => Some((*nesting, attributes)),
            _ => None,
        }
    }

    /// Primitive type of a scalar kind; `None` for collections and objects.
    pub fn scalar_type(&self) -> Option<ElementType> {
        match self {
            ValueKind::Bool { .. } => Some(ElementType::Bool),
            ValueKind::Int32 { .. } => Some(ElementType::Int32),
            ValueKind::Int64 { .. } => Some(ElementType::Int64),
            ValueKind::Float32 { .. } => Some(ElementType::Float32),
            ValueKind::Float64 { .. } => Some(ElementType::Float64),
            ValueKind::String { .. } => Some(ElementType::String),
            ValueKind::Dynamic { .. } => Some(ElementType::Dynamic),
            _ => None,
        }
    }

    /// Element type of a scalar collection; `None` for other kinds.
    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            ValueKind::List { element, .. }
            | ValueKind::Set { element, .. }
            | ValueKind::Map { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Returns true if `value` has the shape this kind describes: the right
    /// primitive for scalars, a list for lists and sets, an object for maps
    /// and single objects. Null and unknown values are always accepted.
    /// Collection elements are not inspected.
    pub fn accepts(&self, value: &ConfigValue) -> bool {
        if let Some(scalar) = self.scalar_type() {
            return scalar.accepts(value);
        }
        if matches!(value, ConfigValue::Null | ConfigValue::Unknown) {
            return true;
        }
        match self {
            ValueKind::List { .. } | ValueKind::Set { .. } => value.elements().is_some(),
            ValueKind::Map { .. } => value.entries().is_some(),
            ValueKind::Object { nesting, .. } => match nesting {
                Nesting::Single | Nesting::Map => value.entries().is_some(),
                Nesting::List | Nesting::Set => value.elements().is_some(),
            },
            _ => false,
        }
    }

    /// Lowercase kind name, as used in the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool { .. } => "bool",
            ValueKind::Int32 { .. } => "int32",
            ValueKind::Int64 { .. } => "int64",
            ValueKind::Float32 { .. } => "float32",
            ValueKind::Float64 { .. } => "float64",
            ValueKind::String { .. } => "string",
            ValueKind::Dynamic { .. } => "dynamic",
            ValueKind::List { .. } => "list",
            ValueKind::Set { .. } => "set",
            ValueKind::Map { .. } => "map",
            ValueKind::Object { .. } => "object",
        }
    }
}

/// A schema attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(flatten)]
    pub kind: ValueKind,
}

impl Attribute {
    pub fn new(kind: ValueKind) -> Self {
        Self { kind }
    }

    pub fn bool() -> Self {
        Self::new(ValueKind::Bool { validators: vec![] })
    }

    pub fn int32() -> Self {
        Self::new(ValueKind::Int32 { validators: vec![] })
    }

    pub fn int64() -> Self {
        Self::new(ValueKind::Int64 { validators: vec![] })
    }

    pub fn float32() -> Self {
        Self::new(ValueKind::Float32 { validators: vec![] })
    }

    pub fn float64() -> Self {
        Self::new(ValueKind::Float64 { validators: vec![] })
    }

    pub fn string() -> Self {
        Self::new(ValueKind::String { validators: vec![] })
    }

    pub fn dynamic() -> Self {
        Self::new(ValueKind::Dynamic { validators: vec![] })
    }

    pub fn list(element: ElementType) -> Self {
        Self::new(ValueKind::List {
            element,
            validators: vec![],
            element_validators: vec![],
        })
    }

    pub fn set(element: ElementType) -> Self {
        Self::new(ValueKind::Set {
            element,
            validators: vec![],
            element_validators: vec![],
        })
    }

    pub fn map(element: ElementType) -> Self {
        Self::new(ValueKind::Map {
            element,
            validators: vec![],
            element_validators: vec![],
        })
    }

    /// A nested object attribute.
    pub fn object(nesting: Nesting, attributes: Schema) -> Self {
        Self::new(ValueKind::Object {
            nesting,
            attributes: attributes.attributes,
            validators: vec![],
        })
    }

    /// Add an attribute-level validator.
    pub fn with_validator(mut self, validator: ValidatorDecl) -> Self {
        self.kind.validators_mut().push(validator);
        self
    }

    /// Add an attribute-level store validator.
    pub fn with_store(self, path_expr: impl Into<PathExpr>) -> Self {
        self.with_validator(ValidatorDecl::store(path_expr))
    }

    /// Add an element validator. Ignored for kinds that have no elements.
    pub fn with_element_validator(mut self, validator: ValidatorDecl) -> Self {
        match &mut self.kind {
            ValueKind::List {
                element_validators, ..
            }
            | ValueKind::Set {
                element_validators, ..
            }
            | ValueKind::Map {
                element_validators, ..
            } => element_validators.push(validator),
            _ => {}
        }
        self
    }

    /// Add an element-level store validator.
    pub fn with_element_store(self, path_expr: impl Into<PathExpr>) -> Self {
        self.with_element_validator(ValidatorDecl::store(path_expr))
    }

    /// First path expression among the attribute-level validators.
    pub fn store_expr(&self) -> Option<&PathExpr> {
        self.kind.validators().iter().find_map(ValidatorDecl::path_expr)
    }

    /// First path expression among the element validators.
    pub fn element_store_expr(&self) -> Option<&PathExpr> {
        self.kind
            .element_validators()
            .iter()
            .find_map(ValidatorDecl::path_expr)
    }
}

/// Root of an attribute schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub attributes: BTreeMap<String, Attribute>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Look up a top-level attribute.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }
}
