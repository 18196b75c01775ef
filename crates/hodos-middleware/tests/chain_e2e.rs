//! End-to-end chain tests.
//!
//! These tests assemble the stages the way an application does:
//!
//! 1. Error envelope
//! 2. Success envelope
//! 3. Body validation
//! 4. Custom middleware
//! 5. Terminal action stage

use std::sync::Arc;

use hodos_core::{Body, RequestContext, RouteError};
use hodos_middleware::{
    from_fn,
    stages::{ErrorEnvelope, SuccessEnvelope, ValidateBody},
    Chain, SharedMiddleware,
};
use hodos_schema::JsonSchema;
use http::{Method, StatusCode};
use serde_json::{json, Value};

fn user_schema() -> JsonSchema {
    JsonSchema::new(json!({
        "type": "object",
        "required": ["name"],
        "properties": { "name": { "type": "string" } },
        "additionalProperties": false
    }))
    .unwrap()
}

fn action() -> SharedMiddleware {
    from_fn("action", |ctx, _next| {
        Box::pin(async move {
            let name = ctx
                .request_body()
                .and_then(|b| b.get("name"))
                .cloned()
                .unwrap_or(Value::Null);
            if name == json!("boom") {
                return Err(RouteError::internal("exploded"));
            }
            ctx.add_meta(json!({"created": 1}));
            ctx.set_status(StatusCode::CREATED);
            ctx.set_body(json!({"name": name}));
            Ok(())
        })
    })
}

fn stack() -> Chain {
    Chain::new(vec![
        Arc::new(ErrorEnvelope::new().include_internal_errors(false)),
        Arc::new(SuccessEnvelope::new()),
        Arc::new(ValidateBody::new(Arc::new(user_schema()))),
        action(),
    ])
}

async fn post(body: Option<Value>) -> RequestContext {
    let mut ctx = RequestContext::new(Method::POST, "/users");
    ctx.set_request_body(body);
    stack().run(&mut ctx).await.unwrap();
    ctx
}

#[tokio::test]
async fn test_valid_request_is_enveloped() {
    let ctx = post(Some(json!({"name": "Ada"}))).await;
    assert_eq!(ctx.status(), Some(StatusCode::CREATED));
    assert_eq!(
        ctx.body(),
        &Body::Json(json!({"success": true, "data": {"name": "Ada"}, "meta": {"created": 1}}))
    );
}

#[tokio::test]
async fn test_invalid_request_names_field() {
    let ctx = post(Some(json!({"name": "Ada", "foo": 1}))).await;
    let body = ctx.body().as_json().unwrap();

    assert_eq!(ctx.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!(-1));
    assert!(body["message"].as_str().unwrap().contains("foo"));
}

#[tokio::test]
async fn test_missing_body() {
    let ctx = post(None).await;
    assert_eq!(ctx.status(), Some(StatusCode::BAD_REQUEST));
    assert_eq!(
        ctx.body().as_json().unwrap()["message"],
        json!("a request body is required")
    );
}

#[tokio::test]
async fn test_internal_error_is_redacted() {
    let ctx = post(Some(json!({"name": "boom"}))).await;
    assert_eq!(ctx.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    assert_eq!(
        ctx.body(),
        &Body::Json(json!({
            "success": false,
            "code": 500,
            "message": "internal server error",
            "data": null
        }))
    );
}
