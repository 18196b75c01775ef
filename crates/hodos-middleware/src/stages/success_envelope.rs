//! Success envelope middleware.
//!
//! After the downstream chain succeeds, a JSON object or array body that has
//! no top-level `success` key is replaced by
//!
//! ```json
//! { "success": true, "data": <body>, "meta": { ... } }
//! ```
//!
//! `meta` is the request's metadata bag (see
//! [`RequestContext::add_meta`]) and is omitted when empty. Text, binary and
//! empty bodies are left alone, as are bodies already carrying `success`.

use hodos_core::{Body, RequestContext};
use serde_json::{Map, Value};

use crate::middleware::{BoxFuture, Middleware, MiddlewareResult, Next};

/// Wraps successful JSON bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuccessEnvelope;

impl SuccessEnvelope {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn should_wrap(body: &Body) -> bool {
        match body {
            Body::Json(Value::Object(map)) => !map.contains_key("success"),
            Body::Json(Value::Array(_)) => true,
            _ => false,
        }
    }

    fn wrap(ctx: &mut RequestContext) {
        if !Self::should_wrap(ctx.body()) {
            return;
        }
        let Body::Json(data) = ctx.take_body() else {
            return;
        };

        let mut envelope = Map::new();
        envelope.insert("success".into(), Value::Bool(true));
        envelope.insert("data".into(), data);
        if !ctx.meta().is_empty() {
            envelope.insert("meta".into(), Value::Object(ctx.meta().clone()));
        }
        ctx.set_body(Value::Object(envelope));
    }
}

impl Middleware for SuccessEnvelope {
    fn name(&self) -> &'static str {
        "success_envelope"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            next.run(ctx).await?;
            Self::wrap(ctx);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Chain, SharedMiddleware};
    use crate::stages::ErrorEnvelope;
    use hodos_core::RouteError;
    use http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::Arc;

    fn respond(body: Body, meta: Option<Value>) -> SharedMiddleware {
        from_fn("respond", move |ctx, _next| {
            let body = body.clone();
            let meta = meta.clone();
            Box::pin(async move {
                if let Some(meta) = meta {
                    ctx.add_meta(meta);
                }
                ctx.set_body(body);
                Ok(())
            })
        })
    }

    async fn run(stages: Vec<SharedMiddleware>) -> RequestContext {
        let mut ctx = RequestContext::new(Method::GET, "/");
        Chain::new(stages).run(&mut ctx).await.unwrap();
        ctx
    }

    #[tokio::test]
    async fn test_wraps_object() {
        let ctx = run(vec![
            Arc::new(SuccessEnvelope),
            respond(Body::Json(json!({"name": "top"})), None),
        ])
        .await;
        assert_eq!(
            ctx.body(),
            &Body::Json(json!({"success": true, "data": {"name": "top"}}))
        );
    }

    #[tokio::test]
    async fn test_includes_meta() {
        let ctx = run(vec![
            Arc::new(SuccessEnvelope),
            respond(Body::Json(json!([1, 2])), Some(json!({"total": 2}))),
        ])
        .await;
        assert_eq!(
            ctx.body(),
            &Body::Json(json!({"success": true, "data": [1, 2], "meta": {"total": 2}}))
        );
    }

    #[tokio::test]
    async fn test_existing_success_key_untouched() {
        let original = json!({"success": false, "reason": "custom"});
        let ctx = run(vec![
            Arc::new(SuccessEnvelope),
            respond(Body::Json(original.clone()), None),
        ])
        .await;
        assert_eq!(ctx.body(), &Body::Json(original));
    }

    #[tokio::test]
    async fn test_applied_twice_wraps_once() {
        let ctx = run(vec![
            Arc::new(SuccessEnvelope),
            Arc::new(SuccessEnvelope),
            respond(Body::Json(json!({"a": 1})), None),
        ])
        .await;
        assert_eq!(ctx.body(), &Body::Json(json!({"success": true, "data": {"a": 1}})));
    }

    #[tokio::test]
    async fn test_text_and_binary_untouched() {
        let ctx = run(vec![Arc::new(SuccessEnvelope), respond(Body::from("plain"), None)]).await;
        assert_eq!(ctx.body(), &Body::from("plain"));

        let bytes = bytes_body();
        let ctx = run(vec![Arc::new(SuccessEnvelope), respond(bytes.clone(), None)]).await;
        assert_eq!(ctx.body(), &bytes);
    }

    #[tokio::test]
    async fn test_error_envelope_inside_is_not_rewrapped() {
        let fail = from_fn("fail", |_ctx, _next| {
            Box::pin(async { Err(RouteError::bad_request("nope")) })
        });
        let ctx = run(vec![
            Arc::new(SuccessEnvelope),
            Arc::new(ErrorEnvelope::new()),
            fail,
        ])
        .await;
        assert_eq!(ctx.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(ctx.body().as_json().unwrap()["success"], json!(false));
    }

    fn bytes_body() -> Body {
        Body::Binary(vec![0_u8, 1, 2].into())
    }
}
