//! Test request building.

use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri};
use http_body_util::Full;
use serde::Serialize;

use crate::error::TestError;

/// Builder for requests sent through a [`TestClient`](crate::TestClient).
///
/// Invalid input (a bad header, an unserializable body) is remembered and
/// reported when the request is built.
#[must_use]
#[derive(Debug)]
pub struct TestRequestBuilder {
    method: Method,
    uri: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            error: None,
        }
    }

    fn fail(&mut self, error: TestError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    /// Sets a header on the request.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = HeaderName::try_from(name.as_ref());
        let value = HeaderValue::try_from(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            (Err(e), _) => self.fail(TestError::Header(e.to_string())),
            (_, Err(e)) => self.fail(TestError::Header(e.to_string())),
        }
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(self, content_type: impl AsRef<str>) -> Self {
        self.header(header::CONTENT_TYPE.as_str(), content_type)
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Appends a query parameter. Repeating a key sends it several times.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Sets the raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the request body as JSON and the `Content-Type` to
    /// `application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.fail(e.into()),
        }
        self.content_type("application/json")
    }

    /// Builds the `http` request.
    pub fn build(self) -> Result<http::Request<Full<Bytes>>, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let uri = if self.query.is_empty() {
            self.uri
        } else {
            let encoded = serde_urlencoded::to_string(&self.query)?;
            let separator = if self.uri.contains('?') { '&' } else { '?' };
            format!("{}{separator}{encoded}", self.uri)
        };
        let uri: Uri = uri.parse().map_err(|e: http::uri::InvalidUri| TestError::Uri {
            reason: e.to_string(),
            uri: uri.clone(),
        })?;

        let mut request = http::Request::new(Full::new(self.body));
        *request.method_mut() = self.method;
        *request.uri_mut() = uri;
        *request.headers_mut() = self.headers;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_header() {
        let request = TestRequestBuilder::new(Method::GET, "/users")
            .header("X-Request-ID", "12345")
            .bearer_token("token")
            .build()
            .unwrap();

        assert_eq!(request.headers()["x-request-id"], "12345");
        assert_eq!(request.headers()["authorization"], "Bearer token");
    }

    #[test]
    fn test_invalid_header_is_reported_on_build() {
        let err = TestRequestBuilder::new(Method::GET, "/users")
            .header("bad header", "value")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::Header(_)));
    }

    #[test]
    fn test_query_parameters() {
        let request = TestRequestBuilder::new(Method::GET, "/users?active=true")
            .query("page", 2)
            .query("tag", "a b")
            .query("tag", "c")
            .build()
            .unwrap();

        assert_eq!(request.uri().path(), "/users");
        assert_eq!(request.uri().query(), Some("active=true&page=2&tag=a+b&tag=c"));
    }

    #[test]
    fn test_json_body() {
        let request = TestRequestBuilder::new(Method::POST, "/users")
            .json(&json!({"name": "Alice"}))
            .build()
            .unwrap();

        assert_eq!(request.headers()["content-type"], "application/json");
        assert_eq!(request.method(), Method::POST);
    }

    #[test]
    fn test_invalid_uri() {
        let err = TestRequestBuilder::new(Method::GET, "not a uri")
            .build()
            .unwrap_err();
        assert!(matches!(err, TestError::Uri { ref uri, .. } if uri == "not a uri"));
    }
}
