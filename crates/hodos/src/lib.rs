//! # hodos
//!
//! Composable route factories for JSON APIs.
//!
//! Routes are declared in factories that construct their own dependencies,
//! carry router-level middleware and nest other factories under a prefix.
//! The composed route table runs each route through schema validation, its
//! own middleware and its action, and the error and success envelopes give
//! every response the same shape:
//!
//! ```json
//! { "success": true, "data": { ... }, "meta": { ... } }
//! { "success": false, "code": -1, "message": "...", "data": null }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → global middleware → parse_body → route table
//!                                              ↓
//!            router middleware → ValidateBody → ValidateQuery → route middleware → action
//! ```
//!
//! [`App::handle`] takes and returns `http` types and never opens a socket;
//! any server that can produce an `http::Request<Full<Bytes>>` can host it.

#![doc(html_root_url = "https://docs.rs/hodos/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod request;
mod response;

pub use app::{App, AppBuilder};
pub use response::HttpResponse;

pub use hodos_config as config;
pub use hodos_core as core;
pub use hodos_docs as docs;
pub use hodos_middleware as middleware;
pub use hodos_router as router;
pub use hodos_routes as routes;
pub use hodos_schema as schema;
pub use hodos_telemetry as telemetry;

/// Installs logging from `config.logging` and registers metric
/// descriptions.
///
/// Call once at startup, before the first request. `service_name` is
/// recorded on the startup event.
///
/// ```rust,no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = hodos::config::ConfigLoader::from_env()?;
/// hodos::init_telemetry(&config, "users-api")?;
/// # Ok(())
/// # }
/// ```
pub fn init_telemetry(
    config: &hodos_config::HodosConfig,
    service_name: &str,
) -> hodos_telemetry::TelemetryResult<()> {
    hodos_telemetry::init_logging(&config.logging.to_log_config(service_name))?;
    hodos_telemetry::describe_metrics();
    Ok(())
}

/// Prelude module for convenient imports.
///
/// ```
/// use hodos::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{init_telemetry, App, AppBuilder};

    pub use hodos_config::{ConfigLoader, HodosConfig};
    pub use hodos_core::{Body, HttpMethod, Reply, RequestContext, RouteError, RouteResult};
    pub use hodos_middleware::stages::{ErrorEnvelope, SuccessEnvelope};
    pub use hodos_middleware::{from_fn, Middleware, Next};
    pub use hodos_routes::{
        action, boxed, paginate, BoxedFactory, ComposeError, PageQuery, Returning, Route,
        RouteDocs, RouteFactory,
    };
    pub use hodos_schema::{FluentSchema, JsonSchema};
}
