//! Structural validation backed by the `jsonschema` crate.

use std::fmt;

use hodos_core::{Schema, ValidationError};
use serde_json::Value;

use crate::error::SchemaError;

/// A compiled JSON Schema document.
///
/// The document is compiled once, at construction. Every violation found in
/// a value is reported, prefixed with the path of the offending value
/// (`user.tags[1]: ...`, or `value: ...` for the root).
pub struct JsonSchema {
    source: Value,
    validator: jsonschema::Validator,
}

impl JsonSchema {
    /// Compiles `schema`.
    pub fn new(schema: Value) -> Result<Self, SchemaError> {
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| SchemaError::Compile(e.to_string()))?;
        Ok(Self {
            source: schema,
            validator,
        })
    }

    /// Parses and compiles a schema from JSON text.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let schema: Value =
            serde_json::from_str(text).map_err(|e| SchemaError::Compile(e.to_string()))?;
        Self::new(schema)
    }

    /// Returns the source document.
    #[must_use]
    pub fn document(&self) -> &Value {
        &self.source
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Schema for JsonSchema {
    fn validate(&self, value: &Value) -> Result<(), ValidationError> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(value)
            .map(|error| format!("{}: {error}", field_path(error.instance_path().as_str())))
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::from_violations(violations))
        }
    }

    fn to_json_schema(&self) -> Option<Value> {
        Some(self.source.clone())
    }
}

/// Turns a JSON pointer (`/user/tags/1`) into the dotted form used by
/// [`FluentSchema`](crate::FluentSchema) messages (`user.tags[1]`).
fn field_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
            path.push('[');
            path.push_str(&segment);
            path.push(']');
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(&segment);
        }
    }
    if path.is_empty() {
        "value".to_string()
    } else {
        path
    }
}
