//! Route factories.
//!
//! A [`RouteFactory`] is the unit of declaration: an optional path prefix, a
//! dependency constructor, the routes it creates, optional router-level
//! middleware and optional nested factories. Nested factories construct their
//! own dependencies; nothing is inherited from the parent except the prefix and
//! the router-level middleware.
//!
//! ```
//! use std::sync::Arc;
//! use hodos_core::Reply;
//! use hodos_routes::{Route, RouteFactory};
//! use serde_json::json;
//!
//! struct Greeter;
//!
//! struct Greeting(String);
//!
//! impl RouteFactory for Greeter {
//!     type Dependencies = Greeting;
//!
//!     fn prefix(&self) -> Option<&str> {
//!         Some("/greet")
//!     }
//!
//!     async fn dependencies(&self) -> anyhow::Result<Greeting> {
//!         Ok(Greeting("hello".into()))
//!     }
//!
//!     async fn create(&self, _deps: Arc<Greeting>) -> anyhow::Result<Vec<Route<Greeting>>> {
//!         Ok(vec![Route::get("/", |deps: Arc<Greeting>, _ctx| {
//!             Box::pin(async move { Ok(Reply::from(json!({ "message": deps.0 }))) })
//!         })])
//!     }
//! }
//! ```

use std::any::type_name;
use std::future::Future;
use std::sync::Arc;

use hodos_middleware::{BoxFuture, SharedMiddleware};

use crate::compose::{join_paths, ComposeError, ResolvedRoute};
use crate::route::{BoundAction, Route};

/// A boxed, type-erased factory, as returned from [`RouteFactory::nested`].
pub type BoxedFactory = Box<dyn DynRouteFactory>;

/// A declarative unit of routes sharing a prefix and a dependency set.
pub trait RouteFactory: Send + Sync + 'static {
    /// Value handed to `create`, `middleware`, `nested` and every action.
    type Dependencies: Send + Sync + 'static;

    /// Path segment prepended to every route this factory produces.
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Constructs the dependencies.
    fn dependencies(&self) -> impl Future<Output = anyhow::Result<Self::Dependencies>> + Send;

    /// Declares this factory's own routes.
    fn create(
        &self,
        deps: Arc<Self::Dependencies>,
    ) -> impl Future<Output = anyhow::Result<Vec<Route<Self::Dependencies>>>> + Send;

    /// Router-level middleware, run ahead of every route this factory and
    /// its nested factories produce.
    fn middleware(
        &self,
        deps: Arc<Self::Dependencies>,
    ) -> impl Future<Output = anyhow::Result<Vec<SharedMiddleware>>> + Send {
        let _ = deps;
        async { Ok(Vec::new()) }
    }

    /// Child factories, resolved independently and mounted under this prefix.
    fn nested(
        &self,
        deps: Arc<Self::Dependencies>,
    ) -> impl Future<Output = anyhow::Result<Vec<BoxedFactory>>> + Send {
        let _ = deps;
        async { Ok(Vec::new()) }
    }
}

/// Object-safe form of [`RouteFactory`], implemented for every factory.
pub trait DynRouteFactory: Send + Sync {
    /// Type name used in error reports.
    fn name(&self) -> &'static str;

    /// The factory's prefix.
    fn prefix(&self) -> Option<&str>;

    /// Resolves the factory and its nested factories into routes.
    fn resolve(&self) -> BoxFuture<'_, Result<Vec<ResolvedRoute>, ComposeError>>;
}

impl<F: RouteFactory> DynRouteFactory for F {
    fn name(&self) -> &'static str {
        type_name::<F>()
    }

    fn prefix(&self) -> Option<&str> {
        RouteFactory::prefix(self)
    }

    fn resolve(&self) -> BoxFuture<'_, Result<Vec<ResolvedRoute>, ComposeError>> {
        Box::pin(resolve_factory(self))
    }
}

/// Wraps a factory for use in [`compose`](crate::compose) or `nested`.
pub fn boxed<F: RouteFactory>(factory: F) -> BoxedFactory {
    Box::new(factory)
}

async fn resolve_factory<F: RouteFactory>(factory: &F) -> Result<Vec<ResolvedRoute>, ComposeError> {
    let name = type_name::<F>();
    let deps = Arc::new(
        factory
            .dependencies()
            .await
            .map_err(|e| ComposeError::factory(name, "construct dependencies", e))?,
    );
    let declared = factory
        .create(Arc::clone(&deps))
        .await
        .map_err(|e| ComposeError::factory(name, "create routes", e))?;
    let router_middleware = factory
        .middleware(Arc::clone(&deps))
        .await
        .map_err(|e| ComposeError::factory(name, "build middleware", e))?;
    let children = factory
        .nested(Arc::clone(&deps))
        .await
        .map_err(|e| ComposeError::factory(name, "build nested factories", e))?;
    let nested_routes = crate::compose::compose(&children).await?;

    let mut routes = Vec::with_capacity(declared.len() + nested_routes.len());
    for route in declared {
        routes.extend(erase(route, &deps));
    }
    routes.extend(nested_routes);

    let prefix = RouteFactory::prefix(factory);
    Ok(routes
        .into_iter()
        .map(|route| route.mount_under(prefix, &router_middleware))
        .collect())
}

/// Expands a declaration's paths and binds its dependencies.
fn erase<D: Send + Sync + 'static>(route: Route<D>, deps: &Arc<D>) -> Vec<ResolvedRoute> {
    let Route {
        paths,
        methods,
        action,
        schema,
        query_schema,
        returning,
        middleware,
        docs,
    } = route;

    let deps = Arc::clone(deps);
    let bound = bind_action(move |ctx| action(Arc::clone(&deps), ctx));
    let middleware = middleware.resolve();

    paths
        .into_iter()
        .map(|path| ResolvedRoute {
            path: join_paths("", &path),
            methods: methods.clone(),
            action: Arc::clone(&bound),
            schema: schema.clone(),
            query_schema: query_schema.clone(),
            returning: returning.clone(),
            router_middleware: Vec::new(),
            middleware: middleware.clone(),
            docs: docs.clone(),
        })
        .collect()
}

fn bind_action<F>(action: F) -> BoundAction
where
    F: for<'a> Fn(&'a mut hodos_core::RequestContext) -> crate::route::ActionFuture<'a>
        + Send
        + Sync
        + 'static,
{
    Arc::new(action)
}
