//! Declarative output schemas and fail-fast validation.
//!
//! A [`Schema`] describes a JSON object as an ordered list of fields.
//! [`validate`] walks fields in declaration order (depth first) and stops
//! at the first problem, which is all the fallback chain needs to decide
//! whether to keep a provider's output. Unknown fields are accepted.
//!
//! ```rust
//! # use huginn::schema::{ArrayLength, FieldType, Schema, validate};
//! let schema = Schema::new()
//!     .required("title", FieldType::String)
//!     .required("keyPoints", FieldType::array_of(FieldType::String).length(ArrayLength::Exact(3)));
//!
//! let ok = serde_json::json!({"title": "t", "keyPoints": ["a", "b", "c"], "extra": 1});
//! assert!(validate(ok, &schema).is_ok());
//!
//! let short = serde_json::json!({"title": "t", "keyPoints": ["a", "b"]});
//! assert!(validate(short, &schema).is_err());
//! ```

use std::fmt;

use serde_json::Value;

/// Required number of items in an array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayLength {
    Exact(usize),
    AtLeast(usize),
}

impl ArrayLength {
    fn accepts(&self, len: usize) -> bool {
        match self {
            ArrayLength::Exact(n) => len == *n,
            ArrayLength::AtLeast(n) => len >= *n,
        }
    }
}

impl fmt::Display for ArrayLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayLength::Exact(n) => write!(f, "exactly {n}"),
            ArrayLength::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Expected type of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array {
        items: Box<FieldType>,
        length: Option<ArrayLength>,
    },
    Object(Schema),
}

impl FieldType {
    /// Array whose items all have type `items`, any length.
    pub fn array_of(items: FieldType) -> Self {
        FieldType::Array {
            items: Box::new(items),
            length: None,
        }
    }

    /// Constrain an array's length. No effect on non-array types.
    pub fn length(self, required: ArrayLength) -> Self {
        match self {
            FieldType::Array { items, .. } => FieldType::Array {
                items,
                length: Some(required),
            },
            other => other,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array { .. } => "array",
            FieldType::Object(_) => "object",
        }
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub required: bool,
    pub ty: FieldType,
}

/// Ordered set of field declarations for a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a required field.
    pub fn required(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            required: true,
            ty,
        });
        self
    }

    /// Declare an optional field; when present it must still match `ty`.
    pub fn optional(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            required: false,
            ty,
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }
}

/// What was wrong at a [`Violation`]'s path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    Missing,
    WrongType {
        expected: &'static str,
        found: &'static str,
    },
    WrongLength {
        expected: ArrayLength,
        found: usize,
    },
}

/// The first schema mismatch found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{path}: {kind}")]
pub struct Violation {
    /// Location of the problem, e.g. `careers[1].title`; `$` is the root.
    pub path: String,
    pub kind: ViolationKind,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::Missing => f.write_str("required field missing"),
            ViolationKind::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            ViolationKind::WrongLength { expected, found } => {
                write!(f, "expected {expected} items, found {found}")
            }
        }
    }
}

/// Validate `value` against `schema`, returning it unchanged on success.
pub fn validate(value: Value, schema: &Schema) -> Result<Value, Violation> {
    check_object(&value, schema, "$")?;
    Ok(value)
}

fn check_object(value: &Value, schema: &Schema, path: &str) -> Result<(), Violation> {
    let Some(map) = value.as_object() else {
        return Err(wrong_type(path, "object", value));
    };
    for field in &schema.fields {
        let field_path = if path == "$" {
            field.name.clone()
        } else {
            format!("{path}.{}", field.name)
        };
        match map.get(&field.name) {
            // An explicit null counts as absent.
            None | Some(Value::Null) if field.required => {
                return Err(Violation {
                    path: field_path,
                    kind: ViolationKind::Missing,
                });
            }
            None | Some(Value::Null) => {}
            Some(v) => check_type(v, &field.ty, &field_path)?,
        }
    }
    Ok(())
}

fn check_type(value: &Value, ty: &FieldType, path: &str) -> Result<(), Violation> {
    match (ty, value) {
        (FieldType::String, Value::String(_)) => Ok(()),
        (FieldType::Number, Value::Number(_)) => Ok(()),
        (FieldType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(()),
        (FieldType::Boolean, Value::Bool(_)) => Ok(()),
        (FieldType::Object(schema), Value::Object(_)) => check_object(value, schema, path),
        (FieldType::Array { items, length }, Value::Array(elements)) => {
            if let Some(length) = length {
                if !length.accepts(elements.len()) {
                    return Err(Violation {
                        path: path.to_string(),
                        kind: ViolationKind::WrongLength {
                            expected: *length,
                            found: elements.len(),
                        },
                    });
                }
            }
            for (i, element) in elements.iter().enumerate() {
                check_type(element, items, &format!("{path}[{i}]"))?;
            }
            Ok(())
        }
        _ => Err(wrong_type(path, ty.name(), value)),
    }
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> Violation {
    Violation {
        path: path.to_string(),
        kind: ViolationKind::WrongType {
            expected,
            found: json_type_name(found),
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
