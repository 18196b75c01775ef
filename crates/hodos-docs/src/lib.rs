//! # hodos docs
//!
//! OpenAPI 3 document generation for a composed hodos route table.
//!
//! The generator is a pure function of the resolved routes: paths, methods,
//! body and query schemas, and each route's [`RouteDocs`](hodos_routes::RouteDocs).
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hodos_docs::OpenApiGenerator;
//!
//! let routes = hodos_routes::compose(&factories).await?;
//! let document = OpenApiGenerator::new()
//!     .title("My API")
//!     .version("1.0.0")
//!     .description("My API")
//!     .generate(&routes)?;
//! println!("{}", document.to_json_pretty()?);
//! ```

mod error;
mod openapi;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    Info, MediaType, OpenApi, OpenApiGenerator, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, Server, Tag, OPENAPI_VERSION,
};
