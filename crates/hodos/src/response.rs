//! Turning a finished context (or an escaped error) into an HTTP response.

use bytes::Bytes;
use hodos_core::{Body, RequestContext, RouteError};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Response, StatusCode};
use http_body_util::Full;
use tracing::{debug, error};

/// The response type produced by [`App::handle`](crate::App::handle).
pub type HttpResponse = Response<Full<Bytes>>;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";
const BINARY: &str = "application/octet-stream";

/// Serializes the context's response side.
///
/// An empty body with no status means nothing handled the request: 404.
/// 204 and 304 responses are always sent without a body.
pub(crate) fn render(ctx: &mut RequestContext) -> HttpResponse {
    let headers = std::mem::take(ctx.response_headers_mut());

    if let Some(status) = ctx
        .status()
        .filter(|s| *s == StatusCode::NO_CONTENT || *s == StatusCode::NOT_MODIFIED)
    {
        ctx.take_body();
        return respond(status, headers, None, Bytes::new());
    }

    let (status, content_type, bytes) = match (ctx.take_body(), ctx.status()) {
        (Body::Empty, None) => (StatusCode::NOT_FOUND, Some(TEXT), Bytes::from_static(b"Not Found")),
        (Body::Empty, Some(status)) => (status, None, Bytes::new()),
        (Body::Json(value), status) => match serde_json::to_vec(&value) {
            Ok(bytes) => (status.unwrap_or(StatusCode::OK), Some(JSON), Bytes::from(bytes)),
            Err(e) => return render_error(&RouteError::from(e), headers),
        },
        (Body::Text(text), status) => (status.unwrap_or(StatusCode::OK), Some(TEXT), Bytes::from(text)),
        (Body::Binary(bytes), status) => (status.unwrap_or(StatusCode::OK), Some(BINARY), bytes),
    };

    respond(status, headers, content_type, bytes)
}

/// The default error handler for errors no envelope caught.
///
/// The message is exposed for client errors; server errors get the
/// canonical reason phrase.
pub(crate) fn render_error(err: &RouteError, headers: HeaderMap) -> HttpResponse {
    let status = err.status();
    let text = if status.as_u16() < 500 {
        debug!(status = status.as_u16(), message = %err.message(), "unhandled client error");
        err.message().to_string()
    } else {
        error!(status = status.as_u16(), error = %err, "unhandled server error");
        status
            .canonical_reason()
            .unwrap_or("Internal Server Error")
            .to_string()
    };
    respond(status, headers, Some(TEXT), Bytes::from(text))
}

fn respond(
    status: StatusCode,
    mut headers: HeaderMap,
    content_type: Option<&'static str>,
    bytes: Bytes,
) -> HttpResponse {
    if let Some(content_type) = content_type {
        headers
            .entry(CONTENT_TYPE)
            .or_insert(HeaderValue::from_static(content_type));
    }
    let mut response = Response::new(Full::new(bytes));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
