//! Document generation errors.

use thiserror::Error;

/// Why an OpenAPI document could not be produced.
#[derive(Debug, Error)]
pub enum DocsError {
    /// `info.title` or `info.version` was never set.
    #[error("openapi info.{0} is required")]
    MissingInfo(&'static str),

    /// Two operations derived the same `operationId`.
    #[error("operationId `{id}` of {second} collides with {first}")]
    DuplicateOperationId {
        /// The colliding id.
        id: String,
        /// `METHOD /path` of the operation that claimed it first.
        first: String,
        /// `METHOD /path` of the operation that collided.
        second: String,
    },

    /// JSON output failed.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

/// Result alias for document generation.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_names_both_operations() {
        let err = DocsError::DuplicateOperationId {
            id: "getUsers".to_string(),
            first: "GET /users".to_string(),
            second: "GET /v2/users".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "operationId `getUsers` of GET /v2/users collides with GET /users"
        );
        assert_eq!(DocsError::MissingInfo("title").to_string(), "openapi info.title is required");
    }
}
