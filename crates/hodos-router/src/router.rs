//! High-level router API.

use std::fmt;

use http::Method;

use crate::method::HttpMethod;
use crate::method_router::MethodRouter;
use crate::node::Node;
use crate::params::Params;

/// A radix tree router mapping `(method, path)` to bindings of type `T`.
///
/// # Example
///
/// ```rust
/// use hodos_router::{HttpMethod, Lookup, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(HttpMethod::Get, "/users/:id", "getUser").unwrap();
///
/// match router.lookup(&Method::GET, "/users/123") {
///     Lookup::Found { value, params } => {
///         assert_eq!(*value, "getUser");
///         assert_eq!(params.get("id"), Some("123"));
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// # Route Priority
///
/// 1. **Static segments** (`/users/me`)
/// 2. **Parameter segments** (`/users/:id`)
/// 3. **Wildcard segments** (`/files/*path`)
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Error returned by [`Router::insert`].
pub enum InsertError<T> {
    /// The `(method, path)` pair is already bound. Carries the rejected value.
    Conflict {
        /// Method of the rejected binding
        method: HttpMethod,
        /// Path of the rejected binding
        path: String,
        /// The value that was not inserted
        value: T,
    },
    /// The path pattern is malformed.
    InvalidPattern {
        /// Offending pattern
        path: String,
        /// What is wrong with it
        reason: String,
    },
}

impl<T> fmt::Debug for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<T> fmt::Display for InsertError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { method, path, .. } => {
                write!(f, "{method} {path} is already bound")
            }
            Self::InvalidPattern { path, reason } => {
                write!(f, "invalid route pattern `{path}`: {reason}")
            }
        }
    }
}

impl<T> std::error::Error for InsertError<T> {}

/// Outcome of [`Router::lookup`].
#[derive(Debug)]
pub enum Lookup<'a, T> {
    /// A binding serves this request.
    Found {
        /// The binding
        value: &'a T,
        /// Captured path parameters
        params: Params,
    },
    /// The path exists but no binding serves the method.
    MethodNotAllowed {
        /// Value for the `Allow` response header
        allow: String,
    },
    /// No route matches the path.
    NotFound,
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Binds `value` to `method` at `path`.
    ///
    /// Path parameters may be written `:name` or `{name}`. A pair that is
    /// already bound is left untouched and reported as [`InsertError::Conflict`].
    pub fn insert(&mut self, method: HttpMethod, path: &str, value: T) -> Result<(), InsertError<T>> {
        let segments = Node::<T>::parse_path(path).map_err(|reason| InsertError::InvalidPattern {
            path: path.to_string(),
            reason,
        })?;
        let node = self.root.descend(&segments);
        node.methods
            .get_or_insert_with(MethodRouter::new)
            .set(method, value)
            .map_err(|value| InsertError::Conflict {
                method,
                path: path.to_string(),
                value,
            })?;
        self.route_count += 1;
        Ok(())
    }

    /// Resolves a request method and path.
    #[must_use]
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        let Some((methods, params)) = self.root.match_path(path) else {
            return Lookup::NotFound;
        };
        let found = HttpMethod::from_http(method).and_then(|m| methods.lookup(m));
        match found {
            Some(value) => Lookup::Found { value, params },
            None => Lookup::MethodNotAllowed {
                allow: methods.allow_header(),
            },
        }
    }

    /// Matches a path without regard to method.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        self.root.match_path(path)
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
