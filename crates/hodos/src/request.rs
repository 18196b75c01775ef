//! Request parsing: query strings and JSON bodies.

use hodos_core::{RequestContext, RouteError};
use hodos_middleware::{BoxFuture, Middleware, MiddlewareResult, Next};
use http::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use tracing::warn;

/// Parses a raw query string into a JSON map.
///
/// Values are strings; a key that repeats collects its values into an array
/// in the order they appear.
pub(crate) fn parse_query(raw: Option<&str>) -> Map<String, Value> {
    let Some(raw) = raw.filter(|q| !q.is_empty()) else {
        return Map::new();
    };

    let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(raw) {
        Ok(pairs) => pairs,
        Err(e) => {
            warn!(error = %e, "unparseable query string ignored");
            return Map::new();
        }
    };

    let mut query = Map::new();
    for (key, value) in pairs {
        match query.get_mut(&key) {
            Some(Value::Array(values)) => values.push(Value::String(value)),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
            None => {
                query.insert(key, Value::String(value));
            }
        }
    }
    query
}

/// Parses the raw request bytes into the context's JSON request body.
///
/// A body declared as JSON that fails to parse is a 400. Any other
/// non-empty body is parsed opportunistically and left unset when it is
/// not JSON.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ParseBody;

impl ParseBody {
    fn is_json(ctx: &RequestContext) -> bool {
        ctx.header(CONTENT_TYPE.as_str())
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }

    fn parse(ctx: &mut RequestContext) -> Result<(), RouteError> {
        if ctx.request_body().is_some() || ctx.raw_body().is_empty() {
            return Ok(());
        }
        match serde_json::from_slice::<Value>(ctx.raw_body()) {
            Ok(body) => ctx.set_request_body(Some(body)),
            Err(e) if Self::is_json(ctx) => {
                return Err(RouteError::bad_request(format!("invalid JSON body: {e}")));
            }
            Err(_) => {}
        }
        Ok(())
    }
}

impl Middleware for ParseBody {
    fn name(&self) -> &'static str {
        "parse_body"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            Self::parse(ctx)?;
            next.run(ctx).await
        })
    }
}
