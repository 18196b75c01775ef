//! The validation capability.
//!
//! Dispatch treats validators as black boxes: a [`Schema`] either accepts a
//! value or explains, in one message, what is wrong with it.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Validates JSON values.
///
/// Implementations must be pure: the same value always yields the same result.
pub trait Schema: Send + Sync + 'static {
    /// Accepts `value` or returns every violation joined into one message.
    fn validate(&self, value: &Value) -> Result<(), ValidationError>;

    /// Renders the schema as JSON Schema, for documentation.
    fn to_json_schema(&self) -> Option<Value> {
        None
    }
}

/// A schema shared between every binding of a route.
pub type SharedSchema = Arc<dyn Schema>;

impl fmt::Debug for dyn Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Schema")
    }
}

/// A failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<String>,
}

impl ValidationError {
    /// Creates an error with a single message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            violations: vec![message.into()],
        }
    }

    /// Creates an error from individual violations.
    #[must_use]
    pub fn from_violations(violations: Vec<String>) -> Self {
        Self { violations }
    }

    /// Returns the individual violations.
    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Returns the violations joined with `", "`.
    #[must_use]
    pub fn message(&self) -> String {
        self.violations.join(", ")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, RouteError};
    use http::StatusCode;
    use serde_json::json;

    struct RequiresName;

    impl Schema for RequiresName {
        fn validate(&self, value: &Value) -> Result<(), ValidationError> {
            if value.get("name").is_some() {
                Ok(())
            } else {
                Err(ValidationError::new("name: is required"))
            }
        }
    }

    #[test]
    fn test_custom_schema() {
        let schema: SharedSchema = Arc::new(RequiresName);
        assert!(schema.validate(&json!({"name": "x"})).is_ok());
        assert!(schema.to_json_schema().is_none());
    }

    #[test]
    fn test_violations_join() {
        let err = ValidationError::from_violations(vec!["a: too short".into(), "b: required".into()]);
        assert_eq!(err.to_string(), "a: too short, b: required");
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_into_route_error() {
        let err: RouteError = ValidationError::new("foo: unexpected").into();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "foo: unexpected");
    }
}
