//! Route composition.
//!
//! [`compose`] flattens a forest of factories into [`ResolvedRoute`]s. Each
//! factory resolves in a fixed order (dependencies, `create`, `middleware`,
//! `nested`); sibling factories resolve concurrently and keep their
//! declaration order in the output. Any failure fails the whole composition.

use std::fmt;
use std::sync::Arc;

use futures_util::future::try_join_all;
use hodos_core::{HttpMethod, SharedSchema};
use hodos_middleware::SharedMiddleware;
use thiserror::Error;

use crate::factory::BoxedFactory;
use crate::returning::Returning;
use crate::route::{BoundAction, RouteDocs};

/// Errors raised while composing or binding routes.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A factory step failed.
    #[error("factory `{factory}` failed to {stage}: {source}")]
    Factory {
        /// Type name of the failing factory
        factory: &'static str,
        /// The step that failed
        stage: &'static str,
        /// Underlying error
        #[source]
        source: anyhow::Error,
    },

    /// A path pattern the router cannot accept.
    #[error("invalid route pattern `{path}`: {reason}")]
    InvalidPattern {
        /// The rejected pattern
        path: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ComposeError {
    pub(crate) fn factory(factory: &'static str, stage: &'static str, source: anyhow::Error) -> Self {
        Self::Factory {
            factory,
            stage,
            source,
        }
    }
}

/// A fully composed route: one absolute path, dependencies bound.
///
/// Methods are still a list here; the binder expands them.
#[derive(Clone)]
pub struct ResolvedRoute {
    pub(crate) path: String,
    pub(crate) methods: Vec<HttpMethod>,
    pub(crate) action: BoundAction,
    pub(crate) schema: Option<SharedSchema>,
    pub(crate) query_schema: Option<SharedSchema>,
    pub(crate) returning: Option<Arc<Returning>>,
    pub(crate) router_middleware: Vec<SharedMiddleware>,
    pub(crate) middleware: Vec<SharedMiddleware>,
    pub(crate) docs: Option<RouteDocs>,
}

impl ResolvedRoute {
    /// Absolute path pattern.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Methods this route answers.
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// Body schema, if declared.
    pub fn schema(&self) -> Option<&SharedSchema> {
        self.schema.as_ref()
    }

    /// Query schema, if declared.
    pub fn query_schema(&self) -> Option<&SharedSchema> {
        self.query_schema.as_ref()
    }

    /// Response projection, if declared.
    pub fn returning(&self) -> Option<&Returning> {
        self.returning.as_deref()
    }

    /// Inherited router-level middleware, outermost first.
    pub fn router_middleware(&self) -> &[SharedMiddleware] {
        &self.router_middleware
    }

    /// Route-own middleware.
    pub fn middleware(&self) -> &[SharedMiddleware] {
        &self.middleware
    }

    /// Documentation fragment.
    pub fn docs(&self) -> Option<&RouteDocs> {
        self.docs.as_ref()
    }

    /// True when both routes invoke the same action.
    pub fn shares_action_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.action, &other.action)
    }

    /// Applies one factory level: prefix the path and put the factory's
    /// middleware ahead of whatever the route already inherited.
    pub(crate) fn mount_under(mut self, prefix: Option<&str>, middleware: &[SharedMiddleware]) -> Self {
        if let Some(prefix) = prefix {
            self.path = join_paths(prefix, &self.path);
        }
        if !middleware.is_empty() {
            let mut inherited = middleware.to_vec();
            inherited.append(&mut self.router_middleware);
            self.router_middleware = inherited;
        }
        self
    }
}

impl fmt::Debug for ResolvedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRoute")
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field(
                "router_middleware",
                &self.router_middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("docs", &self.docs)
            .finish_non_exhaustive()
    }
}

/// Composes factories into a flat route list.
pub async fn compose(factories: &[BoxedFactory]) -> Result<Vec<ResolvedRoute>, ComposeError> {
    let resolved = try_join_all(factories.iter().map(|factory| factory.resolve())).await?;
    Ok(resolved.into_iter().flatten().collect())
}

/// Joins two path fragments.
///
/// Empty segments are dropped, so repeated, leading and trailing slashes
/// collapse. The result always starts with `/` and never ends with one,
/// except for the root itself.
///
/// ```
/// use hodos_routes::join_paths;
///
/// assert_eq!(join_paths("/all/", "/b//nested/"), "/all/b/nested");
/// assert_eq!(join_paths("", ""), "/");
/// assert_eq!(join_paths("api", "users/:id"), "/api/users/:id");
/// ```
pub fn join_paths(prefix: &str, path: &str) -> String {
    let mut joined = String::with_capacity(prefix.len() + path.len() + 1);
    for segment in prefix.split('/').chain(path.split('/')).filter(|s| !s.is_empty()) {
        joined.push('/');
        joined.push_str(segment);
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}
