//! Schema construction errors.

use thiserror::Error;

/// Errors raised while building a schema. Validation failures are reported
/// through [`hodos_core::ValidationError`] instead.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The JSON Schema document could not be compiled.
    #[error("invalid JSON Schema: {0}")]
    Compile(String),

    /// A pattern refinement is not a valid regular expression.
    #[error("invalid pattern `{pattern}`: {source}")]
    Pattern {
        /// The rejected pattern
        pattern: String,
        /// Regex compiler error
        #[source]
        source: regex::Error,
    },
}
