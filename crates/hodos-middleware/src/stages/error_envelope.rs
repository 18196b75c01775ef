//! Error envelope middleware.
//!
//! Catches any error returned by the downstream chain and renders it as
//!
//! ```json
//! { "success": false, "code": -1, "message": "...", "data": null }
//! ```
//!
//! with the error's HTTP status. `code` falls back to the numeric status when
//! the error carries none. Messages of untrusted errors are replaced by a
//! fixed string unless internal errors are exposed.
//!
//! The stage may be mounted at several nesting levels: the outermost instance
//! marks the request, and inner instances then pass errors through untouched
//! so every failure is enveloped exactly once.
//!
//! # Example
//!
//! ```
//! use hodos_middleware::stages::ErrorEnvelope;
//! use serde_json::json;
//!
//! let envelope = ErrorEnvelope::new()
//!     .include_internal_errors(false)
//!     .transform(|_err, mut body, ctx| {
//!         body["requestId"] = json!(ctx.request_id().to_string());
//!         body
//!     });
//! ```

use std::fmt;
use std::sync::Arc;

use hodos_config::HodosConfig;
use hodos_core::{RequestContext, RouteError};
use hodos_telemetry::record_error;
use serde_json::{json, Value};

use crate::events::{self, ErrorEvent};
use crate::middleware::{BoxFuture, Middleware, MiddlewareResult, Next};

/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_VAR: &str = "HODOS_ENVIRONMENT";

const DEFAULT_INTERNAL_MESSAGE: &str = "internal server error";

/// Post-processes an envelope: receives the raw error, the default envelope
/// and the request context; returns the body to send.
pub type EnvelopeTransform = dyn Fn(&RouteError, Value, &RequestContext) -> Value + Send + Sync;

/// Marks a request as already covered by an envelope.
struct EnvelopeGuard;

/// Renders downstream errors as JSON failure envelopes.
#[derive(Clone)]
pub struct ErrorEnvelope {
    include_internal_errors: bool,
    internal_error_message: String,
    transform: Option<Arc<EnvelopeTransform>>,
}

impl Default for ErrorEnvelope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorEnvelope")
            .field("include_internal_errors", &self.include_internal_errors)
            .field("internal_error_message", &self.internal_error_message)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl ErrorEnvelope {
    /// Creates the stage.
    ///
    /// Internal error messages are exposed unless the process variable
    /// `HODOS_ENVIRONMENT` is `production`. Only the live process
    /// environment is read: `.env` files and config files are not. Use
    /// [`from_config`](Self::from_config) to follow a loaded
    /// [`HodosConfig`].
    #[must_use]
    pub fn new() -> Self {
        let production = std::env::var(ENVIRONMENT_VAR)
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        Self {
            include_internal_errors: !production,
            internal_error_message: DEFAULT_INTERNAL_MESSAGE.to_string(),
            transform: None,
        }
    }

    /// Creates the stage with redaction taken from
    /// [`HodosConfig::include_internal_errors`].
    #[must_use]
    pub fn from_config(config: &HodosConfig) -> Self {
        Self::new().include_internal_errors(config.include_internal_errors())
    }

    /// Sets whether untrusted error messages reach clients.
    #[must_use]
    pub fn include_internal_errors(mut self, include: bool) -> Self {
        self.include_internal_errors = include;
        self
    }

    /// Sets the message that replaces redacted errors.
    #[must_use]
    pub fn internal_error_message(mut self, message: impl Into<String>) -> Self {
        self.internal_error_message = message.into();
        self
    }

    /// Installs a transform applied to every envelope before it is sent.
    #[must_use]
    pub fn transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&RouteError, Value, &RequestContext) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Builds the default envelope for `err`.
    #[must_use]
    pub fn envelope(&self, err: &RouteError) -> Value {
        let status = err.status();
        let message = if err.is_trusted() || self.include_internal_errors {
            err.message()
        } else {
            self.internal_error_message.as_str()
        };
        json!({
            "success": false,
            "code": err.code().unwrap_or_else(|| i64::from(status.as_u16())),
            "message": message,
            "data": err.data().cloned().unwrap_or(Value::Null),
        })
    }

    fn render(&self, ctx: &mut RequestContext, err: RouteError) {
        let status = err.status();
        let mut body = self.envelope(&err);
        if let Some(transform) = &self.transform {
            body = transform(&err, body, ctx);
        }

        if status.is_server_error() {
            tracing::error!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = ctx.path(),
                status = status.as_u16(),
                error = %err,
                "request failed"
            );
        } else {
            tracing::warn!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = ctx.path(),
                status = status.as_u16(),
                error = %err,
                "request rejected"
            );
        }
        record_error(status.as_u16());

        ctx.set_status(status);
        ctx.set_body(body.clone());

        events::publish(ErrorEvent {
            request_id: ctx.request_id().to_string(),
            method: ctx.method().clone(),
            path: ctx.path().to_string(),
            status,
            error: Arc::new(err),
            response: body,
        });
    }
}

impl Middleware for ErrorEnvelope {
    fn name(&self) -> &'static str {
        "error_envelope"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            if ctx.has_extension::<EnvelopeGuard>() {
                return next.run(ctx).await;
            }
            ctx.set_extension(EnvelopeGuard);

            if let Err(err) = next.run(ctx).await {
                self.render(ctx, err);
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::subscribe_errors;
    use crate::middleware::{from_fn, Chain, SharedMiddleware};
    use hodos_core::Body;
    use http::{Method, StatusCode};

    fn failing(err: fn() -> RouteError) -> SharedMiddleware {
        from_fn("failing", move |_ctx, _next| Box::pin(async move { Err(err()) }))
    }

    async fn run(stages: Vec<SharedMiddleware>) -> (RequestContext, MiddlewareResult) {
        let mut ctx = RequestContext::new(Method::GET, "/things");
        let result = Chain::new(stages).run(&mut ctx).await;
        (ctx, result)
    }

    #[tokio::test]
    async fn test_success_passes_through() {
        let ok = from_fn("ok", |ctx, _next| {
            Box::pin(async move {
                ctx.set_body(json!({"fine": true}));
                Ok(())
            })
        });
        let (ctx, result) = run(vec![Arc::new(ErrorEnvelope::new()), ok]).await;
        assert!(result.is_ok());
        assert_eq!(ctx.body(), &Body::Json(json!({"fine": true})));
    }

    #[tokio::test]
    async fn test_trusted_error_with_data() {
        let (ctx, result) = run(vec![
            Arc::new(ErrorEnvelope::new().include_internal_errors(false)),
            failing(|| RouteError::bad_request("foo").with_data(json!({"bar": true}))),
        ])
        .await;

        assert!(result.is_ok());
        assert_eq!(ctx.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(
            ctx.body(),
            &Body::Json(json!({"success": false, "code": -1, "message": "foo", "data": {"bar": true}}))
        );
    }

    #[tokio::test]
    async fn test_code_defaults_to_status() {
        let (ctx, _) = run(vec![
            Arc::new(ErrorEnvelope::new()),
            failing(|| RouteError::internal("db down").with_status(StatusCode::SERVICE_UNAVAILABLE)),
        ])
        .await;
        assert_eq!(ctx.body().as_json().unwrap()["code"], json!(503));
    }

    #[tokio::test]
    async fn test_untrusted_message_redacted() {
        let (ctx, _) = run(vec![
            Arc::new(ErrorEnvelope::new().include_internal_errors(false)),
            failing(|| RouteError::internal("password=hunter2")),
        ])
        .await;
        assert_eq!(ctx.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(ctx.body().as_json().unwrap()["message"], json!("internal server error"));
    }

    #[tokio::test]
    async fn test_untrusted_message_exposed_when_included() {
        let (ctx, _) = run(vec![
            Arc::new(ErrorEnvelope::new().include_internal_errors(true)),
            failing(|| RouteError::internal("db down")),
        ])
        .await;
        assert_eq!(ctx.body().as_json().unwrap()["message"], json!("db down"));
    }

    #[test]
    fn test_from_config_follows_environment() {
        let err = RouteError::internal("db down");

        let production = ErrorEnvelope::from_config(&HodosConfig::production());
        assert_eq!(production.envelope(&err)["message"], json!("internal server error"));

        let development = ErrorEnvelope::from_config(&HodosConfig::development());
        assert_eq!(development.envelope(&err)["message"], json!("db down"));

        let mut opted_in = HodosConfig::production();
        opted_in.errors.include_internal_errors = Some(true);
        assert_eq!(
            ErrorEnvelope::from_config(&opted_in).envelope(&err)["message"],
            json!("db down")
        );
    }

    #[tokio::test]
    async fn test_nested_envelopes_wrap_once() {
        let outer = ErrorEnvelope::new().transform(|_, mut body, _| {
            body["layer"] = json!("outer");
            body
        });
        let inner = ErrorEnvelope::new().transform(|_, mut body, _| {
            body["layer"] = json!("inner");
            body
        });
        let (ctx, _) = run(vec![
            Arc::new(outer),
            Arc::new(inner),
            failing(|| RouteError::not_found("gone")),
        ])
        .await;

        let body = ctx.body().as_json().unwrap();
        assert_eq!(body["layer"], json!("outer"));
        assert_eq!(body["message"], json!("gone"));
    }

    #[tokio::test]
    async fn test_transform_receives_raw_error() {
        let envelope = ErrorEnvelope::new()
            .include_internal_errors(false)
            .transform(|err, _body, ctx| json!({"raw": err.message(), "path": ctx.path()}));
        let (ctx, _) = run(vec![Arc::new(envelope), failing(|| RouteError::internal("secret"))]).await;
        assert_eq!(
            ctx.body().as_json().unwrap(),
            &json!({"raw": "secret", "path": "/things"})
        );
    }

    #[tokio::test]
    async fn test_publishes_error_event() {
        let mut events = subscribe_errors();
        let (_ctx, _) = run(vec![
            Arc::new(ErrorEnvelope::new().include_internal_errors(false)),
            failing(|| RouteError::internal("event-probe")),
        ])
        .await;

        loop {
            let event = events.recv().await.unwrap();
            if event.error.message() == "event-probe" {
                assert_eq!(event.status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(event.response["message"], json!("internal server error"));
                assert_eq!(event.path, "/things");
                break;
            }
        }
    }
}
