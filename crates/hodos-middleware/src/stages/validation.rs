//! Schema validation stages.
//!
//! The route binder places [`ValidateBody`] and [`ValidateQuery`] directly
//! after router-level middleware, and only when the route declares the
//! corresponding schema. Failures are annotated and returned as errors; they
//! are never recovered here.

use hodos_core::{RequestContext, RouteError, SharedSchema};

use crate::middleware::{BoxFuture, Middleware, MiddlewareResult, Next};

/// Message used when a body schema is declared but the request has no body.
pub const BODY_REQUIRED_MESSAGE: &str = "a request body is required";

/// Validates the parsed request body.
#[derive(Debug, Clone)]
pub struct ValidateBody {
    schema: SharedSchema,
}

impl ValidateBody {
    /// Creates the stage.
    #[must_use]
    pub fn new(schema: SharedSchema) -> Self {
        Self { schema }
    }
}

impl Middleware for ValidateBody {
    fn name(&self) -> &'static str {
        "validate_body"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let Some(body) = ctx.request_body() else {
                return Err(RouteError::validation(BODY_REQUIRED_MESSAGE).annotate());
            };
            self.schema
                .validate(body)
                .map_err(|e| RouteError::from(e).annotate())?;
            next.run(ctx).await
        })
    }
}

/// Validates the parsed query map, presented to the schema as a JSON object.
#[derive(Debug, Clone)]
pub struct ValidateQuery {
    schema: SharedSchema,
}

impl ValidateQuery {
    /// Creates the stage.
    #[must_use]
    pub fn new(schema: SharedSchema) -> Self {
        Self { schema }
    }
}

impl Middleware for ValidateQuery {
    fn name(&self) -> &'static str {
        "validate_query"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            self.schema
                .validate(&ctx.query_value())
                .map_err(|e| RouteError::from(e).annotate())?;
            next.run(ctx).await
        })
    }
}
