//! Collected responses and envelope-aware assertions.

use std::fmt;

use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use http_body_util::{BodyExt, Full};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// A fully collected response.
///
/// Accessors return `Result` so tests can use `?`; the `assert_*` methods
/// panic with the body in the message and return `&Self` for chaining.
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects the body of an app response.
    pub async fn from_http(response: http::Response<Full<Bytes>>) -> Self {
        let (parts, body) = response.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Self::new(parts.status, parts.headers, body)
    }

    /// Wraps already collected parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Numeric status.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&HeaderValue> {
        self.headers.get(name.as_ref())
    }

    /// Header value if it is visible ASCII.
    pub fn header_str(&self, name: impl AsRef<str>) -> Option<&str> {
        self.header(name)?.to_str().ok()
    }

    /// `Content-Type`, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE)
    }

    /// Raw body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String, TestError> {
        Ok(String::from_utf8(self.body.to_vec())?)
    }

    /// Body decoded as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body decoded as an untyped JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// `data` of a success or error envelope.
    pub fn data(&self) -> Result<Value, TestError> {
        Ok(self.json_value()?.get("data").cloned().unwrap_or(Value::Null))
    }

    /// `meta` of a success envelope, if the action set one.
    pub fn meta(&self) -> Result<Option<Value>, TestError> {
        Ok(self.json_value()?.get("meta").cloned())
    }

    /// # Panics
    ///
    /// On a different status.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert!(
            self.status == expected,
            "status {} (expected {expected}), body: {}",
            self.status,
            self.lossy_body()
        );
        self
    }

    /// Same as [`assert_status`](Self::assert_status) with a number.
    ///
    /// # Panics
    ///
    /// On a different status or a number that is not a status code.
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        let expected = StatusCode::from_u16(expected)
            .unwrap_or_else(|_| panic!("{expected} is not an HTTP status"));
        self.assert_status(expected)
    }

    /// # Panics
    ///
    /// When the header is missing or differs.
    pub fn assert_header(&self, name: impl AsRef<str>, expected: impl AsRef<str>) -> &Self {
        let name = name.as_ref();
        match self.header_str(name) {
            Some(actual) => assert_eq!(actual, expected.as_ref(), "header `{name}`"),
            None => panic!("no `{name}` header in {:?}", self.headers),
        }
        self
    }

    /// Compares the media type only, so `text/plain` matches
    /// `text/plain; charset=utf-8`.
    ///
    /// # Panics
    ///
    /// When the header is missing or has another media type.
    pub fn assert_content_type(&self, expected: impl AsRef<str>) -> &Self {
        let actual = self.content_type().unwrap_or_default();
        let media_type = actual.split(';').next().unwrap_or_default().trim();
        assert_eq!(media_type, expected.as_ref(), "content-type `{actual}`");
        self
    }

    /// Checks `{"success": true, "data": expected}`.
    ///
    /// # Panics
    ///
    /// When the body is not a success envelope around `expected`.
    pub fn assert_data(&self, expected: &Value) -> &Self {
        let body = self.envelope();
        assert_eq!(body["success"], Value::Bool(true), "not a success envelope: {body}");
        assert_eq!(&body["data"], expected, "envelope data");
        self
    }

    /// Checks `{"success": false, "message": message}`.
    ///
    /// # Panics
    ///
    /// When the body is not an error envelope with that message.
    pub fn assert_error_message(&self, message: &str) -> &Self {
        let body = self.envelope();
        assert_eq!(body["success"], Value::Bool(false), "not an error envelope: {body}");
        assert_eq!(body["message"], message, "envelope message");
        self
    }

    fn envelope(&self) -> Value {
        self.json_value()
            .unwrap_or_else(|e| panic!("{e}, body: {}", self.lossy_body()))
    }

    fn lossy_body(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body", &self.lossy_body())
            .finish()
    }
}
