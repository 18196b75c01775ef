//! Route errors.
//!
//! [`RouteError`] is the single error type that flows through a route's
//! middleware chain. Its [`ErrorKind`] decides whether the message may be
//! shown to clients: trusted and validation errors always are, everything else
//! is subject to redaction by the error envelope.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::schema::ValidationError;

/// Result type alias using [`RouteError`].
pub type RouteResult<T> = Result<T, RouteError>;

/// Classification of a [`RouteError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Constructed deliberately by application code. Safe to reveal.
    Trusted,
    /// Produced by a schema. Always 400, safe to reveal.
    Validation,
    /// Anything else that went wrong: converted foreign errors, panics turned
    /// into errors, framework failures. Message may be redacted.
    Internal,
    /// An action returned nothing and set no body.
    EmptyResponse,
}

/// The error entity carried through dispatch.
///
/// # Example
///
/// ```
/// use hodos_core::RouteError;
/// use http::StatusCode;
/// use serde_json::json;
///
/// let err = RouteError::new(StatusCode::BAD_REQUEST, "foo").with_data(json!({"bar": true}));
/// assert_eq!(err.status(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.code(), Some(-1));
/// assert!(err.is_trusted());
/// ```
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RouteError {
    kind: ErrorKind,
    status: StatusCode,
    code: Option<i64>,
    message: String,
    data: Option<Value>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RouteError {
    /// Creates a trusted error with an explicit status.
    ///
    /// Trusted errors carry code `-1` unless [`Self::with_code`] overrides it.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Trusted,
            status,
            code: Some(-1),
            message: message.into(),
            data: None,
            source: None,
        }
    }

    /// Creates a trusted 400 error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Creates a trusted 401 error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Creates a trusted 403 error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    /// Creates a trusted 404 error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Creates a validation error (400).
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            status: StatusCode::BAD_REQUEST,
            code: None,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    /// Creates an untrusted error. Its message is hidden from clients when
    /// internal errors are not exposed.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: None,
            message: message.into(),
            data: None,
            source: None,
        }
    }

    /// Wraps an arbitrary error as an untrusted 500.
    pub fn from_error(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::internal(err.to_string()).with_source(err)
    }

    /// The error raised when an action returns nothing without setting a body.
    #[must_use]
    pub fn empty_response(path: &str) -> Self {
        Self {
            kind: ErrorKind::EmptyResponse,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: None,
            message: format!(
                "route {path} returned no value and set no response body; \
                 return `false` explicitly to send an empty response"
            ),
            data: None,
            source: None,
        }
    }

    /// Overrides the machine code.
    #[must_use]
    pub fn with_code(mut self, code: i64) -> Self {
        self.code = Some(code);
        self
    }

    /// Overrides the HTTP status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Attaches a JSON payload sent as the envelope's `data`.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Fills in code `-1` when no code was set.
    ///
    /// Applied by the dispatch wrappers before an error leaves a route.
    #[must_use]
    pub fn annotate(mut self) -> Self {
        self.code.get_or_insert(-1);
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the machine code, if one was set.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    /// Returns the unredacted message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the attached data.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Returns true if the message may be shown to clients verbatim.
    #[must_use]
    pub fn is_trusted(&self) -> bool {
        matches!(self.kind, ErrorKind::Trusted | ErrorKind::Validation)
    }
}

impl From<ValidationError> for RouteError {
    fn from(err: ValidationError) -> Self {
        Self::validation(err.message())
    }
}

impl From<anyhow::Error> for RouteError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<RouteError>() {
            Ok(route_error) => route_error,
            Err(other) => Self::internal(format!("{other:#}")).with_source(AnyhowSource(other)),
        }
    }
}

impl From<serde_json::Error> for RouteError {
    fn from(err: serde_json::Error) -> Self {
        Self::from_error(err)
    }
}

/// Adapter that lets an `anyhow::Error` sit in the `source` chain.
#[derive(Debug, Error)]
#[error(transparent)]
struct AnyhowSource(anyhow::Error);
