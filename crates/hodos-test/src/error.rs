//! Errors from building test requests and reading responses.

use thiserror::Error;

/// Something went wrong on the test side, not in the app under test.
#[derive(Debug, Error)]
pub enum TestError {
    /// Header name or value rejected by `http`.
    #[error("bad header: {0}")]
    Header(String),

    /// The URI (with query appended) does not parse.
    #[error("bad uri `{uri}`: {reason}")]
    Uri {
        /// The URI that was built.
        uri: String,
        /// Parser message.
        reason: String,
    },

    /// Query pairs could not be encoded.
    #[error("bad query: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),

    /// JSON encoding of a request or decoding of a response failed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Response body is not UTF-8.
    #[error("body is not utf-8: {0}")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}
