//! Validators for hodos routes.
//!
//! Two [`Schema`](hodos_core::Schema) implementations with the same contract:
//!
//! - [`JsonSchema`] compiles a JSON Schema document and reports every violation
//! - [`FluentSchema`] is a code-first builder for the common cases
//!
//! ```
//! use hodos_core::Schema;
//! use hodos_schema::{FluentSchema, JsonSchema};
//! use serde_json::json;
//!
//! let structural = JsonSchema::new(json!({
//!     "type": "object",
//!     "properties": { "a": { "type": "string" } },
//!     "additionalProperties": false
//! })).unwrap();
//! assert!(structural.validate(&json!({"foo": 1})).unwrap_err().to_string().contains("foo"));
//!
//! let fluent = FluentSchema::object().field("a", FluentSchema::string()).strict();
//! assert!(fluent.validate(&json!({"a": "x"})).is_ok());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod fluent;
mod json;

pub use error::SchemaError;
pub use fluent::FluentSchema;
pub use json::JsonSchema;
