//! # hodos core
//!
//! Foundational types shared by every hodos crate:
//!
//! - [`RequestContext`] - the mutable per-request context middleware and actions operate on
//! - [`Body`] - the response body slot
//! - [`RouteError`] - the structured error entity carried through dispatch
//! - [`Schema`] - the validation capability consumed by the dispatch pipeline
//! - [`Reply`] - what an action returns
//! - [`HttpMethod`] - the finite method set routes bind to

#![doc(html_root_url = "https://docs.rs/hodos-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod reply;
mod schema;

pub use context::{Body, RequestContext, RequestId};
pub use error::{ErrorKind, RouteError, RouteResult};
pub use hodos_router::{HttpMethod, Params};
pub use reply::Reply;
pub use schema::{Schema, SharedSchema, ValidationError};
