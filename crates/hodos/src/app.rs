//! The application: global middleware in front of the mounted route table.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use hodos_config::{DocsSettings, HodosConfig};
use hodos_core::RequestContext;
use hodos_docs::{DocsResult, OpenApi, OpenApiGenerator};
use hodos_middleware::stages::{ErrorEnvelope, SuccessEnvelope};
use hodos_middleware::{Chain, Middleware, SharedMiddleware};
use hodos_routes::{bind, compose, BoxedFactory, ComposeError, ResolvedRoute, RouteTable};
use hodos_telemetry::metrics::record_request;
use http::{Method, Request};
use http_body_util::{BodyExt, Full};
use tracing::debug;

use crate::request::{parse_query, ParseBody};
use crate::response::{render, render_error, HttpResponse};

/// A composed, dispatchable application.
///
/// Cloning is cheap; clones share the same chain and route table.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use hodos::prelude::*;
/// use serde_json::json;
///
/// struct Hello;
///
/// impl RouteFactory for Hello {
///     type Dependencies = ();
///
///     async fn dependencies(&self) -> anyhow::Result<()> {
///         Ok(())
///     }
///
///     async fn create(&self, _deps: Arc<()>) -> anyhow::Result<Vec<Route<()>>> {
///         Ok(vec![Route::get("/hello/:name", |_deps, ctx| Box::pin(async move {
///             Ok(Reply::from(json!({ "hello": ctx.param("name") })))
///         }))])
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let app = App::builder()
///     .error_envelope()
///     .success_envelope()
///     .mount(vec![boxed(Hello)])
///     .await?
///     .build();
///
/// let request = http::Request::get("/hello/ada")
///     .body(http_body_util::Full::new(bytes::Bytes::new()))
///     .unwrap();
/// let response = app.handle(request).await;
/// assert_eq!(response.status(), 200);
/// # Ok::<(), ComposeError>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct App {
    inner: Arc<Inner>,
}

struct Inner {
    chain: Chain,
    table: Arc<RouteTable>,
    docs: DocsSettings,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("chain", &self.inner.chain)
            .field("routes", &self.inner.table.len())
            .finish()
    }
}

impl App {
    /// Starts building an application.
    pub fn builder() -> AppBuilder {
        AppBuilder::default()
    }

    /// The mounted routes, in composition order.
    pub fn routes(&self) -> &[ResolvedRoute] {
        self.inner.table.routes()
    }

    /// Names of the global stages, route table last.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.inner.chain.names()
    }

    /// Handles one request entirely in memory.
    pub async fn handle(&self, request: Request<Full<Bytes>>) -> HttpResponse {
        let (parts, body) = request.into_parts();
        let raw_body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let head = parts.method == Method::HEAD;
        let method = parts.method.clone();
        let mut ctx = RequestContext::new(parts.method, parts.uri.path())
            .with_headers(parts.headers)
            .with_raw_body(raw_body)
            .with_query(parse_query(parts.uri.query()));

        debug!(request_id = %ctx.request_id(), method = %method, path = %ctx.path(), "request");

        let mut response = match self.inner.chain.run(&mut ctx).await {
            Ok(()) => render(&mut ctx),
            Err(err) => render_error(&err, std::mem::take(ctx.response_headers_mut())),
        };

        if head {
            *response.body_mut() = Full::new(Bytes::new());
        }

        record_request(method.as_str(), response.status().as_u16(), ctx.elapsed());
        response
    }

    /// Generates the OpenAPI document for the mounted routes using the
    /// configured docs settings.
    pub fn openapi(&self) -> DocsResult<OpenApi> {
        let docs = &self.inner.docs;
        let mut generator = OpenApiGenerator::new()
            .title(docs.title.clone())
            .version(docs.version.clone());
        if let Some(description) = &docs.description {
            generator = generator.description(description.clone());
        }
        for server in &docs.servers {
            generator = generator.server(server.url.clone(), server.description.clone());
        }
        generator.generate(self.routes())
    }
}

/// Builder for [`App`].
#[derive(Default)]
pub struct AppBuilder {
    middleware: Vec<SharedMiddleware>,
    routes: Vec<ResolvedRoute>,
    table: Option<RouteTable>,
    config: HodosConfig,
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("middleware", &self.middleware.len())
            .field("routes", &self.routes.len())
            .field("environment", &self.config.environment)
            .finish()
    }
}

impl AppBuilder {
    /// Uses `config` for envelopes and documentation.
    ///
    /// Call before [`Self::error_envelope`] so the envelope picks up the
    /// error settings.
    pub fn config(mut self, config: &HodosConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Appends a global middleware; global stages run before every route chain.
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared global middleware.
    pub fn shared_middleware(mut self, middleware: SharedMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Appends an [`ErrorEnvelope`] configured from the current config.
    pub fn error_envelope(self) -> Self {
        let envelope = ErrorEnvelope::from_config(&self.config);
        self.middleware(envelope)
    }

    /// Appends a [`SuccessEnvelope`].
    pub fn success_envelope(self) -> Self {
        self.middleware(SuccessEnvelope::new())
    }

    /// Composes `factories` and binds them next to anything already mounted.
    pub async fn mount(mut self, factories: Vec<BoxedFactory>) -> Result<Self, ComposeError> {
        let routes = compose(&factories).await?;
        self.routes.extend(routes);
        self.table = Some(bind(self.routes.clone())?);
        Ok(self)
    }

    /// Finishes the application.
    pub fn build(self) -> App {
        let table = Arc::new(self.table.unwrap_or_default());

        let mut stages = self.middleware;
        stages.push(Arc::new(ParseBody));
        stages.push(Arc::clone(&table) as SharedMiddleware);

        App {
            inner: Arc::new(Inner {
                chain: Chain::new(stages),
                table,
                docs: self.config.docs,
            }),
        }
    }
}
