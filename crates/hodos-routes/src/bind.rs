//! Binding resolved routes into a dispatchable table.
//!
//! Each `(route, method)` pair gets its own chain:
//!
//! 1. inherited router-level middleware, outermost first
//! 2. body validation, when the route declares a body schema
//! 3. query validation, when the route declares a query schema
//! 4. route-own middleware
//! 5. the action invoker
//!
//! The action invoker turns the action's [`Reply`] into the response:
//!
//! - `Reply::Nothing` with no body set by the action is a programmer error
//!   and fails with a 500 naming the route
//! - a truthy reply (or any reply once the status is already 204) becomes the
//!   body, projected through `returning` when declared
//! - if no body ends up set, the status becomes 204

use std::sync::Arc;

use hodos_core::{Body, HttpMethod, Reply, RequestContext, RouteError};
use hodos_middleware::stages::{ValidateBody, ValidateQuery};
use hodos_middleware::{BoxFuture, Chain, Middleware, MiddlewareResult, Next, SharedMiddleware};
use hodos_router::{InsertError, Lookup, Router};
use http::header::{HeaderValue, ALLOW};
use http::{Method, StatusCode};
use tracing::{debug, warn};

use crate::compose::{ComposeError, ResolvedRoute};
use crate::returning::Returning;
use crate::route::BoundAction;

/// Outcome of [`RouteTable::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A route chain ran.
    Matched,
    /// The path matched but the method did not; status and `Allow` are set.
    MethodNotAllowed,
    /// `OPTIONS` on a known path without an explicit binding; 204 with `Allow`.
    Options,
    /// No route matched; the context is untouched.
    NotFound,
}

struct Binding {
    pattern: String,
    chain: Chain,
}

/// The dispatchable route table produced by [`bind`].
pub struct RouteTable {
    router: Router<Binding>,
    routes: Vec<ResolvedRoute>,
}

impl std::fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteTable")
            .field("bindings", &self.router.len())
            .field("routes", &self.routes)
            .finish()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            router: Router::new(),
            routes: Vec::new(),
        }
    }
}

/// Builds the per-method chains and registers them with the host router.
///
/// A `(method, path)` pair that is already bound keeps its first binding;
/// later duplicates are logged and skipped.
pub fn bind(routes: Vec<ResolvedRoute>) -> Result<RouteTable, ComposeError> {
    let mut router = Router::new();

    for route in &routes {
        let chain = build_chain(route);
        let mut seen: Vec<HttpMethod> = Vec::with_capacity(route.methods.len());

        for &method in &route.methods {
            if seen.contains(&method) {
                continue;
            }
            seen.push(method);

            let binding = Binding {
                pattern: route.path.clone(),
                chain: chain.clone(),
            };
            match router.insert(method, &route.path, binding) {
                Ok(()) => debug!(method = %method, path = %route.path, chain = ?chain, "route bound"),
                Err(InsertError::Conflict { method, path, .. }) => {
                    warn!(method = %method, path = %path, "duplicate route binding skipped");
                }
                Err(InsertError::InvalidPattern { path, reason }) => {
                    return Err(ComposeError::InvalidPattern { path, reason });
                }
            }
        }
    }

    Ok(RouteTable { router, routes })
}

fn build_chain(route: &ResolvedRoute) -> Chain {
    let mut stages: Vec<SharedMiddleware> = route.router_middleware.clone();
    if let Some(schema) = &route.schema {
        stages.push(Arc::new(ValidateBody::new(Arc::clone(schema))));
    }
    if let Some(schema) = &route.query_schema {
        stages.push(Arc::new(ValidateQuery::new(Arc::clone(schema))));
    }
    stages.extend(route.middleware.iter().cloned());
    stages.push(Arc::new(ActionInvoker {
        path: route.path.clone(),
        action: Arc::clone(&route.action),
        returning: route.returning.clone(),
    }));
    Chain::new(stages)
}

impl RouteTable {
    /// The routes this table was bound from, in composition order.
    pub fn routes(&self) -> &[ResolvedRoute] {
        &self.routes
    }

    /// Number of `(method, path)` bindings.
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// True when nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }

    /// Matches `ctx` against the table and runs the matching chain.
    pub async fn dispatch(&self, ctx: &mut RequestContext) -> Result<Dispatch, RouteError> {
        let method = ctx.method().clone();
        match self.router.lookup(&method, ctx.path()) {
            Lookup::Found { value, params } => {
                debug!(method = %method, pattern = %value.pattern, "dispatching");
                ctx.set_params(params);
                value.chain.run(ctx).await?;
                Ok(Dispatch::Matched)
            }
            Lookup::MethodNotAllowed { allow } => {
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    ctx.response_headers_mut().insert(ALLOW, value);
                }
                if method == Method::OPTIONS {
                    ctx.set_status(StatusCode::NO_CONTENT);
                    Ok(Dispatch::Options)
                } else {
                    ctx.set_status(StatusCode::METHOD_NOT_ALLOWED);
                    ctx.set_body("Method Not Allowed");
                    Ok(Dispatch::MethodNotAllowed)
                }
            }
            Lookup::NotFound => Ok(Dispatch::NotFound),
        }
    }
}

impl Middleware for RouteTable {
    fn name(&self) -> &'static str {
        "route_table"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            match self.dispatch(ctx).await? {
                Dispatch::NotFound => next.run(ctx).await,
                _ => Ok(()),
            }
        })
    }
}

/// Final stage of every route chain.
struct ActionInvoker {
    path: String,
    action: BoundAction,
    returning: Option<Arc<Returning>>,
}

impl ActionInvoker {
    fn respond(&self, ctx: &mut RequestContext, reply: Reply) -> Result<(), RouteError> {
        if matches!(reply, Reply::Nothing) && !ctx.body().is_set() {
            return Err(RouteError::empty_response(&self.path).annotate());
        }

        if ctx.status() == Some(StatusCode::NO_CONTENT) {
            // A forced 204 never carries a payload.
            ctx.set_body(Body::Empty);
        } else if reply.is_truthy() {
            let body = match reply {
                Reply::Json(value) => match &self.returning {
                    Some(returning) => returning.apply(&value).map_or(Body::Empty, Body::Json),
                    None => Body::Json(value),
                },
                Reply::Text(text) => Body::Text(text),
                Reply::Binary(bytes) => Body::Binary(bytes),
                Reply::Nothing => Body::Empty,
            };
            ctx.set_body(body);
        }

        if !ctx.body().is_set() {
            ctx.take_body();
            ctx.set_status(StatusCode::NO_CONTENT);
        }
        Ok(())
    }
}

impl Middleware for ActionInvoker {
    fn name(&self) -> &'static str {
        "action"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            let reply = (self.action)(ctx).await.map_err(RouteError::annotate)?;
            self.respond(ctx, reply)?;
            next.run(ctx).await
        })
    }
}
