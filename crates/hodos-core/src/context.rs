//! Request context types.
//!
//! The [`RequestContext`] is the single mutable value every middleware and
//! action in a route chain operates on. It carries the parsed request, the
//! response being built, a JSON `state` bag, typed extensions, and the
//! response metadata bag read by the success envelope.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde_json::{Map, Value};
use uuid::Uuid;

use hodos_router::Params;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate and sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The response body slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Body {
    /// Nothing written yet.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// Plain text.
    Text(String),
    /// Raw bytes. Never wrapped by the success envelope.
    Binary(Bytes),
}

impl Body {
    /// Returns true if a non-empty body has been written.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match self {
            Self::Empty => false,
            Self::Json(_) => true,
            Self::Text(text) => !text.is_empty(),
            Self::Binary(bytes) => !bytes.is_empty(),
        }
    }

    /// Returns the JSON document, if the body is JSON.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

/// Per-request context that flows through a route's middleware chain.
///
/// # Example
///
/// ```
/// use hodos_core::{Body, RequestContext};
/// use http::{Method, StatusCode};
/// use serde_json::json;
///
/// let mut ctx = RequestContext::new(Method::POST, "/users")
///     .with_request_body(json!({"name": "Alice"}));
///
/// ctx.set_status(StatusCode::CREATED);
/// ctx.set_body(json!({"id": 1}));
/// ctx.add_meta(json!({"total": 1}));
///
/// assert_eq!(ctx.status(), Some(StatusCode::CREATED));
/// assert!(ctx.body().is_set());
/// assert_eq!(ctx.meta()["total"], 1);
/// ```
pub struct RequestContext {
    request_id: RequestId,
    started_at: Instant,

    method: Method,
    path: String,
    params: Params,
    headers: HeaderMap,
    raw_body: Bytes,
    request_body: Option<Value>,
    query: Map<String, Value>,

    status: Option<StatusCode>,
    body: Body,
    response_headers: HeaderMap,

    /// Request-scoped JSON bag shared by middleware and actions.
    pub state: Map<String, Value>,
    meta: Map<String, Value>,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("status", &self.status)
            .field("body", &self.body)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

impl RequestContext {
    /// Creates a context for `method` and `path` with an empty request.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            started_at: Instant::now(),
            method,
            path: path.into(),
            params: Params::new(),
            headers: HeaderMap::new(),
            raw_body: Bytes::new(),
            request_body: None,
            query: Map::new(),
            status: None,
            body: Body::Empty,
            response_headers: HeaderMap::new(),
            state: Map::new(),
            meta: Map::new(),
            extensions: HashMap::new(),
        }
    }

    /// Sets the request headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the raw request bytes.
    #[must_use]
    pub fn with_raw_body(mut self, raw_body: Bytes) -> Self {
        self.raw_body = raw_body;
        self
    }

    /// Sets the parsed request body.
    #[must_use]
    pub fn with_request_body(mut self, body: Value) -> Self {
        self.request_body = Some(body);
        self
    }

    /// Sets the parsed query map.
    #[must_use]
    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = query;
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the time elapsed since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, without query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the captured path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns one path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Replaces the captured path parameters. Set by the route table.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a request header as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw request bytes.
    #[must_use]
    pub fn raw_body(&self) -> &Bytes {
        &self.raw_body
    }

    /// Returns the parsed request body, `None` when the request had none.
    #[must_use]
    pub fn request_body(&self) -> Option<&Value> {
        self.request_body.as_ref()
    }

    /// Replaces the parsed request body.
    pub fn set_request_body(&mut self, body: Option<Value>) {
        self.request_body = body;
    }

    /// Returns the parsed query map.
    #[must_use]
    pub fn query(&self) -> &Map<String, Value> {
        &self.query
    }

    /// Replaces the parsed query map.
    pub fn set_query(&mut self, query: Map<String, Value>) {
        self.query = query;
    }

    /// Returns the parsed query map as a JSON object.
    #[must_use]
    pub fn query_value(&self) -> Value {
        Value::Object(self.query.clone())
    }

    /// Returns the response status, if one was set.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Sets the response status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Returns the response body.
    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Writes the response body. A status of `200` is implied when none is set.
    pub fn set_body(&mut self, body: impl Into<Body>) {
        self.body = body.into();
        if self.status.is_none() {
            self.status = Some(StatusCode::OK);
        }
    }

    /// Takes the response body, leaving it empty.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Returns the response headers.
    #[must_use]
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Returns the response headers for modification.
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Merges `meta` into the response metadata bag.
    ///
    /// Object keys are merged shallowly: new keys are added, existing keys
    /// are overwritten, nothing is removed. Non-object values are ignored.
    pub fn add_meta(&mut self, meta: Value) {
        if let Value::Object(map) = meta {
            self.meta.extend(map);
        }
    }

    /// Returns the response metadata bag.
    #[must_use]
    pub fn meta(&self) -> &Map<String, Value> {
        &self.meta
    }

    /// Stores a typed extension value.
    ///
    /// # Example
    ///
    /// ```
    /// use hodos_core::RequestContext;
    /// use http::Method;
    ///
    /// struct CurrentUser(String);
    ///
    /// let mut ctx = RequestContext::new(Method::GET, "/");
    /// ctx.set_extension(CurrentUser("alice".into()));
    /// assert_eq!(ctx.get_extension::<CurrentUser>().unwrap().0, "alice");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref())
    }

    /// Retrieves a typed extension value for modification.
    pub fn get_extension_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions
            .get_mut(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_mut())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// Returns true if an extension of type `T` is stored.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}
