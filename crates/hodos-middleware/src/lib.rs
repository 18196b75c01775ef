//! # hodos middleware
//!
//! The middleware chain that serves every mounted route, plus the stages the
//! route binder and applications compose into it.
//!
//! ## Per-route chain
//!
//! ```text
//! router middleware (outermost factory first)
//!   → ValidateBody   (only if the route declares a body schema)
//!   → ValidateQuery  (only if the route declares a query schema)
//!   → route middleware
//!   → action
//! ```
//!
//! Applications usually put [`ErrorEnvelope`](stages::ErrorEnvelope) and
//! [`SuccessEnvelope`](stages::SuccessEnvelope) at the top of that chain,
//! either globally or as router middleware of a factory.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use hodos_middleware::stages::{ErrorEnvelope, SuccessEnvelope};
//! use hodos_middleware::{from_fn, Chain};
//! use serde_json::json;
//!
//! let chain = Chain::new(vec![
//!     Arc::new(ErrorEnvelope::new()),
//!     Arc::new(SuccessEnvelope::new()),
//!     from_fn("hello", |ctx, _next| Box::pin(async move {
//!         ctx.set_body(json!({"hello": "world"}));
//!         Ok(())
//!     })),
//! ]);
//! assert_eq!(chain.names(), vec!["error_envelope", "success_envelope", "hello"]);
//! ```

#![doc(html_root_url = "https://docs.rs/hodos-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod events;
pub mod middleware;
pub mod stages;

pub use events::{subscribe_errors, ErrorEvent};
pub use middleware::{
    from_fn, BoxFuture, Chain, FnMiddleware, Middleware, MiddlewareResult, Next, SharedMiddleware,
};
