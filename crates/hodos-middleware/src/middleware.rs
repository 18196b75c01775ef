//! Core middleware trait and types.
//!
//! A route is served by an ordered chain of [`Middleware`]. Each stage gets
//! the mutable [`RequestContext`] and a [`Next`] handle for the remainder of
//! the chain. Calling `next.run(ctx)` runs everything downstream; not calling
//! it short-circuits the chain. Errors travel back up as `Err(RouteError)`
//! until a stage (usually the error envelope) turns them into a response.
//!
//! # Example
//!
//! ```
//! use hodos_core::RequestContext;
//! use hodos_middleware::{BoxFuture, Middleware, MiddlewareResult, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut RequestContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, MiddlewareResult> {
//!         Box::pin(async move {
//!             let result = next.run(ctx).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
//!             result
//!         })
//!     }
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hodos_core::{RequestContext, RouteError};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What every middleware stage resolves to.
pub type MiddlewareResult = Result<(), RouteError>;

/// A shared middleware stage.
pub type SharedMiddleware = Arc<dyn Middleware>;

/// The core middleware trait.
///
/// # Invariants
///
/// - A stage calls `next.run()` at most once
/// - A stage that calls `next.run()` returns its error unless it deliberately
///   renders it (as the error envelope does)
pub trait Middleware: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs this stage.
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult>;
}

/// Handle to the rest of a middleware chain.
///
/// Consumed by [`Next::run`], so it can only be invoked once.
pub struct Next<'a> {
    remaining: &'a [SharedMiddleware],
}

impl<'a> Next<'a> {
    /// Creates a handle that runs `chain` in order.
    #[must_use]
    pub fn new(chain: &'a [SharedMiddleware]) -> Self {
        Self { remaining: chain }
    }

    /// Returns the number of stages left.
    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    /// Returns true if the chain is exhausted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Runs the next stage. An exhausted chain resolves to `Ok(())`.
    pub fn run<'b>(self, ctx: &'b mut RequestContext) -> BoxFuture<'b, MiddlewareResult>
    where
        'a: 'b,
    {
        match self.remaining.split_first() {
            Some((stage, rest)) => stage.process(ctx, Next { remaining: rest }),
            None => Box::pin(async { Ok(()) }),
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use hodos_middleware::from_fn;
/// use serde_json::json;
///
/// let tag = from_fn("tag", |ctx, next| {
///     Box::pin(async move {
///         ctx.state.insert("tagged".into(), json!(true));
///         next.run(ctx).await
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new closure-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, MiddlewareResult>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        (self.func)(ctx, next)
    }
}

/// Wraps a closure as a [`SharedMiddleware`].
pub fn from_fn<F>(name: &'static str, func: F) -> SharedMiddleware
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, MiddlewareResult>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnMiddleware::new(name, func))
}

/// An owned, ordered middleware chain.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<SharedMiddleware>,
}

impl Chain {
    /// Creates a chain from stages in execution order.
    #[must_use]
    pub fn new(stages: Vec<SharedMiddleware>) -> Self {
        Self { stages }
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[SharedMiddleware] {
        &self.stages
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs the whole chain against `ctx`.
    pub async fn run(&self, ctx: &mut RequestContext) -> MiddlewareResult {
        Next::new(&self.stages).run(ctx).await
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
