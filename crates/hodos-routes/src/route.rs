//! Route declarations.
//!
//! A [`Route`] is one entry returned by a factory's `create`: one or more
//! paths, one or more methods, an action, and the optional schemas,
//! middleware, response projection and documentation that go with it.
//!
//! Actions receive the factory's dependencies explicitly as their first
//! argument:
//!
//! ```
//! use std::sync::Arc;
//! use hodos_core::{HttpMethod, Reply};
//! use hodos_routes::Route;
//! use serde_json::json;
//!
//! struct Db {
//!     greeting: String,
//! }
//!
//! let route: Route<Db> = Route::new([HttpMethod::Get, HttpMethod::Head], ["/hello", "/hi"], |db: Arc<Db>, _ctx| {
//!     Box::pin(async move { Ok(Reply::from(json!({ "greeting": db.greeting }))) })
//! });
//! assert_eq!(route.paths().len(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use hodos_core::{HttpMethod, Reply, RequestContext, RouteError, Schema, SharedSchema};
use hodos_middleware::{BoxFuture, SharedMiddleware};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::returning::Returning;

/// Future returned by actions.
pub type ActionFuture<'a> = BoxFuture<'a, Result<Reply, RouteError>>;

/// An action with its dependencies still unbound.
pub type Action<D> =
    Arc<dyn for<'a> Fn(Arc<D>, &'a mut RequestContext) -> ActionFuture<'a> + Send + Sync>;

/// An action with its dependencies captured.
pub type BoundAction = Arc<dyn for<'a> Fn(&'a mut RequestContext) -> ActionFuture<'a> + Send + Sync>;

/// Boxes a closure as an [`Action`], fixing its signature.
///
/// Useful when one action serves several route declarations.
pub fn action<D, F>(action: F) -> Action<D>
where
    F: for<'a> Fn(Arc<D>, &'a mut RequestContext) -> ActionFuture<'a> + Send + Sync + 'static,
{
    Arc::new(action)
}

/// Produces route middleware lazily, when the route is composed.
pub type MiddlewareThunk = Arc<dyn Fn() -> Vec<SharedMiddleware> + Send + Sync>;

/// One or more path patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths(pub Vec<String>);

impl From<&str> for Paths {
    fn from(path: &str) -> Self {
        Self(vec![path.to_string()])
    }
}

impl From<String> for Paths {
    fn from(path: String) -> Self {
        Self(vec![path])
    }
}

impl From<Vec<String>> for Paths {
    fn from(paths: Vec<String>) -> Self {
        Self(paths)
    }
}

impl From<Vec<&str>> for Paths {
    fn from(paths: Vec<&str>) -> Self {
        Self(paths.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Paths {
    fn from(paths: [&str; N]) -> Self {
        Self(paths.into_iter().map(str::to_string).collect())
    }
}

/// One or more methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Methods(pub Vec<HttpMethod>);

impl From<HttpMethod> for Methods {
    fn from(method: HttpMethod) -> Self {
        Self(vec![method])
    }
}

impl From<Vec<HttpMethod>> for Methods {
    fn from(methods: Vec<HttpMethod>) -> Self {
        Self(methods)
    }
}

impl<const N: usize> From<[HttpMethod; N]> for Methods {
    fn from(methods: [HttpMethod; N]) -> Self {
        Self(methods.to_vec())
    }
}

/// Documentation attached to a route. Dispatch ignores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDocs {
    /// Short summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Longer description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Grouping tags
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Marks the operation deprecated
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Explicit operation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl RouteDocs {
    /// Creates docs with a summary.
    #[must_use]
    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Marks the route deprecated.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Sets the operation id.
    #[must_use]
    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }
}

/// Route-own middleware: a list, or a thunk evaluated at composition.
#[derive(Clone, Default)]
pub enum RouteMiddleware {
    /// No route middleware
    #[default]
    None,
    /// A fixed list
    List(Vec<SharedMiddleware>),
    /// Evaluated when the route is composed
    Thunk(MiddlewareThunk),
}

impl RouteMiddleware {
    /// Evaluates to the ordered list.
    #[must_use]
    pub fn resolve(&self) -> Vec<SharedMiddleware> {
        match self {
            Self::None => Vec::new(),
            Self::List(list) => list.clone(),
            Self::Thunk(thunk) => thunk(),
        }
    }
}

/// A route declaration, generic over the owning factory's dependencies.
pub struct Route<D> {
    pub(crate) paths: Vec<String>,
    pub(crate) methods: Vec<HttpMethod>,
    pub(crate) action: Action<D>,
    pub(crate) schema: Option<SharedSchema>,
    pub(crate) query_schema: Option<SharedSchema>,
    pub(crate) returning: Option<Arc<Returning>>,
    pub(crate) middleware: RouteMiddleware,
    pub(crate) docs: Option<RouteDocs>,
}

impl<D> fmt::Debug for Route<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("paths", &self.paths)
            .field("methods", &self.methods)
            .field("schema", &self.schema.is_some())
            .field("query_schema", &self.query_schema.is_some())
            .field("returning", &self.returning)
            .finish_non_exhaustive()
    }
}

macro_rules! method_constructor {
    ($($(#[$doc:meta])* $name:ident => $method:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name<F>(paths: impl Into<Paths>, action: F) -> Self
            where
                F: for<'a> Fn(Arc<D>, &'a mut RequestContext) -> ActionFuture<'a>
                    + Send
                    + Sync
                    + 'static,
            {
                Self::new(HttpMethod::$method, paths, action)
            }
        )*
    };
}

impl<D: Send + Sync + 'static> Route<D> {
    /// Declares a route for `methods` × `paths`.
    pub fn new<F>(methods: impl Into<Methods>, paths: impl Into<Paths>, action: F) -> Self
    where
        F: for<'a> Fn(Arc<D>, &'a mut RequestContext) -> ActionFuture<'a> + Send + Sync + 'static,
    {
        Self::with_action(methods, paths, Arc::new(action))
    }

    /// Declares a route around an existing, possibly shared, [`Action`].
    pub fn with_action(methods: impl Into<Methods>, paths: impl Into<Paths>, action: Action<D>) -> Self {
        Self {
            paths: paths.into().0,
            methods: methods.into().0,
            action,
            schema: None,
            query_schema: None,
            returning: None,
            middleware: RouteMiddleware::None,
            docs: None,
        }
    }

    method_constructor! {
        /// Declares a `GET` route.
        get => Get,
        /// Declares a `POST` route.
        post => Post,
        /// Declares a `PUT` route.
        put => Put,
        /// Declares a `PATCH` route.
        patch => Patch,
        /// Declares a `DELETE` route.
        delete => Delete,
        /// Declares a `HEAD` route.
        head => Head,
        /// Declares an `OPTIONS` route.
        options => Options,
        /// Declares a route answering every method.
        all => All,
    }

    /// Declares a route whose action receives the request body and query
    /// already deserialized.
    ///
    /// A missing body deserializes from `null`, so `Option<T>` and `()` body
    /// types accept body-less requests. Deserialization failures are 400
    /// validation errors.
    pub fn typed<B, Q, F>(methods: impl Into<Methods>, paths: impl Into<Paths>, action: F) -> Self
    where
        B: DeserializeOwned + Send + 'static,
        Q: DeserializeOwned + Send + 'static,
        F: for<'a> Fn(Arc<D>, &'a mut RequestContext, B, Q) -> ActionFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        Self::new(methods, paths, move |deps, ctx| {
            match parse_typed::<B, Q>(ctx) {
                Ok((body, query)) => action(deps, ctx, body, query),
                Err(err) => Box::pin(async move { Err(err) }),
            }
        })
    }

    /// Validates the request body against `schema` before the action runs.
    #[must_use]
    pub fn schema(self, schema: impl Schema) -> Self {
        self.shared_schema(Arc::new(schema))
    }

    /// Like [`Route::schema`], for a schema shared between routes.
    #[must_use]
    pub fn shared_schema(mut self, schema: SharedSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Validates the query map against `schema` before the action runs.
    #[must_use]
    pub fn query_schema(mut self, schema: impl Schema) -> Self {
        self.query_schema = Some(Arc::new(schema));
        self
    }

    /// Projects the action's JSON result before it becomes the body.
    #[must_use]
    pub fn returning(mut self, returning: Returning) -> Self {
        self.returning = Some(Arc::new(returning));
        self
    }

    /// Appends route-own middleware, run after validation.
    #[must_use]
    pub fn middleware(mut self, middleware: Vec<SharedMiddleware>) -> Self {
        self.middleware = RouteMiddleware::List(middleware);
        self
    }

    /// Supplies route-own middleware through a thunk evaluated at composition.
    #[must_use]
    pub fn middleware_fn<F>(mut self, thunk: F) -> Self
    where
        F: Fn() -> Vec<SharedMiddleware> + Send + Sync + 'static,
    {
        self.middleware = RouteMiddleware::Thunk(Arc::new(thunk));
        self
    }

    /// Attaches documentation.
    #[must_use]
    pub fn docs(mut self, docs: RouteDocs) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Returns the declared paths.
    #[must_use]
    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    /// Returns the declared methods.
    #[must_use]
    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }
}

fn parse_typed<B, Q>(ctx: &RequestContext) -> Result<(B, Q), RouteError>
where
    B: DeserializeOwned,
    Q: DeserializeOwned,
{
    let body_value = ctx.request_body().cloned().unwrap_or(Value::Null);
    let body = serde_json::from_value(body_value).map_err(|e| {
        RouteError::validation(format!("invalid request body: {e}")).annotate()
    })?;
    let query = serde_json::from_value(ctx.query_value()).map_err(|e| {
        RouteError::validation(format!("invalid query parameters: {e}")).annotate()
    })?;
    Ok((body, query))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize)]
    struct NewUser {
        name: String,
    }

    #[derive(Deserialize)]
    struct Paging {
        page: Option<String>,
    }

    #[test]
    fn test_shortcuts_set_method_and_path() {
        let route: Route<()> = Route::post("/users", |_, _| Box::pin(async { Ok(Reply::Nothing) }));
        assert_eq!(route.methods(), &[HttpMethod::Post]);
        assert_eq!(route.paths(), &["/users".to_string()]);

        let route: Route<()> = Route::all(vec!["/a", "/b"], |_, _| Box::pin(async { Ok(Reply::Nothing) }));
        assert_eq!(route.methods(), &[HttpMethod::All]);
        assert_eq!(route.paths().len(), 2);
    }

    #[test]
    fn test_thunk_middleware_resolves_lazily() {
        let route: Route<()> = Route::get("/", |_, _| Box::pin(async { Ok(Reply::Nothing) }))
            .middleware_fn(Vec::new);
        assert!(matches!(route.middleware, RouteMiddleware::Thunk(_)));
        assert!(route.middleware.resolve().is_empty());
    }

    #[tokio::test]
    async fn test_typed_route_parses_body_and_query() {
        let route: Route<()> = Route::typed(
            HttpMethod::Post,
            "/users",
            |_, _ctx, body: NewUser, query: Paging| {
                Box::pin(async move { Ok(Reply::from(json!({"name": body.name, "page": query.page}))) })
            },
        );

        let mut query = serde_json::Map::new();
        query.insert("page".into(), json!("3"));
        let mut ctx = RequestContext::new(Method::POST, "/users")
            .with_request_body(json!({"name": "Ada"}))
            .with_query(query);

        let reply = (route.action)(Arc::new(()), &mut ctx).await.unwrap();
        assert_eq!(reply, Reply::from(json!({"name": "Ada", "page": "3"})));
    }

    #[tokio::test]
    async fn test_typed_route_rejects_bad_body() {
        let route: Route<()> = Route::typed(
            HttpMethod::Post,
            "/users",
            |_, _ctx, _body: NewUser, _query: Value| Box::pin(async { Ok(Reply::Nothing) }),
        );
        let mut ctx = RequestContext::new(Method::POST, "/users").with_request_body(json!({"nom": 1}));

        let err = (route.action)(Arc::new(()), &mut ctx).await.unwrap_err();
        assert_eq!(err.status(), http::StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("invalid request body"));
    }

    #[test]
    fn test_shared_action() {
        let shared = action(|_deps: Arc<()>, _ctx| Box::pin(async { Ok(Reply::from(true)) }));
        let a: Route<()> = Route::with_action(HttpMethod::Get, "/a", Arc::clone(&shared));
        let b: Route<()> = Route::with_action(HttpMethod::Put, "/b", shared);
        assert!(Arc::ptr_eq(&a.action, &b.action));
    }

    #[test]
    fn test_docs_builder() {
        let docs = RouteDocs::summary("List users").tag("users").deprecated();
        assert_eq!(
            serde_json::to_value(&docs).unwrap(),
            json!({"summary": "List users", "tags": ["users"], "deprecated": true})
        );
    }
}
