//! Radix tree host router for hodos.
//!
//! The route composer produces a flat table of `(method, path)` bindings;
//! this crate stores them and resolves incoming requests to one binding,
//! a "method not allowed" outcome, or "not found".
//!
//! # Features
//!
//! - **Radix Tree Matching**: lookup cost grows with path length, not route count
//! - **Path Parameters**: `/users/:id` or `/users/{id}`
//! - **Wildcards**: catch-all routes (`/files/*path`)
//! - **Method Tables**: one binding per method plus an "any method" slot
//!
//! # Example
//!
//! ```rust
//! use hodos_router::{HttpMethod, Lookup, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(HttpMethod::Get, "/users", 1).unwrap();
//! router.insert(HttpMethod::Get, "/users/:id", 2).unwrap();
//!
//! assert!(matches!(router.lookup(&Method::GET, "/users/7"), Lookup::Found { value: &2, .. }));
//! assert!(matches!(router.lookup(&Method::POST, "/users"), Lookup::MethodNotAllowed { .. }));
//! assert!(matches!(router.lookup(&Method::GET, "/posts"), Lookup::NotFound));
//! ```

mod method;
mod method_router;
mod node;
mod params;
mod router;

pub use method::{HttpMethod, UnknownMethod};
pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::{InsertError, Lookup, Router};
