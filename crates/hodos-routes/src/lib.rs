//! # hodos routes
//!
//! Declarative route factories and the machinery that turns them into a
//! dispatchable table.
//!
//! - [`Route`] declares one or more paths and methods around an action
//! - [`RouteFactory`] groups routes under a prefix with shared dependencies,
//!   router-level middleware and nested factories
//! - [`compose`] flattens factories into [`ResolvedRoute`]s
//! - [`bind`] builds the per-route middleware chains into a [`RouteTable`]
//! - [`Returning`] projects action results; [`paginate`] builds list metadata
//!
//! ```
//! use std::sync::Arc;
//! use hodos_core::{Reply, RequestContext};
//! use hodos_routes::{bind, boxed, compose, Route, RouteFactory};
//! use http::Method;
//! use serde_json::json;
//!
//! struct Health;
//!
//! impl RouteFactory for Health {
//!     type Dependencies = ();
//!
//!     fn prefix(&self) -> Option<&str> {
//!         Some("/health")
//!     }
//!
//!     async fn dependencies(&self) -> anyhow::Result<()> {
//!         Ok(())
//!     }
//!
//!     async fn create(&self, _deps: Arc<()>) -> anyhow::Result<Vec<Route<()>>> {
//!         Ok(vec![Route::get("/", |_, _| Box::pin(async { Ok(Reply::from(json!({"ok": true}))) }))])
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let routes = compose(&[boxed(Health)]).await.unwrap();
//! let table = bind(routes).unwrap();
//!
//! let mut ctx = RequestContext::new(Method::GET, "/health");
//! table.dispatch(&mut ctx).await.unwrap();
//! assert_eq!(ctx.body().as_json(), Some(&json!({"ok": true})));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hodos-routes/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bind;
mod compose;
mod factory;
mod pagination;
mod returning;
mod route;

pub use bind::{bind, Dispatch, RouteTable};
pub use compose::{compose, join_paths, ComposeError, ResolvedRoute};
pub use factory::{boxed, BoxedFactory, DynRouteFactory, RouteFactory};
pub use pagination::{paginate, PageQuery, Pagination, DEFAULT_PER_PAGE};
pub use returning::{Returning, ReturningError};
pub use route::{
    action, Action, ActionFuture, BoundAction, Methods, MiddlewareThunk, Paths, Route, RouteDocs,
    RouteMiddleware,
};
