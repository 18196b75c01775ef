//! Layered configuration for hodos applications.
//!
//! Configuration is built from defaults, an optional TOML or JSON file, an
//! optional `.env` file and `HODOS_*` environment variables, in that order.
//! Unknown fields in files are rejected.
//!
//! # Configuration File Format
//!
//! ```toml
//! environment = "production"
//!
//! [errors]
//! include_internal_errors = false
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [docs]
//! title = "Users API"
//! version = "1.0.0"
//!
//! [[docs.servers]]
//! url = "https://api.example.com"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `HODOS_ENVIRONMENT=production`
//! - `HODOS_ERRORS__INCLUDE_INTERNAL_ERRORS=true`
//! - `HODOS_LOGGING__LEVEL=debug`
//! - `HODOS_DOCS__TITLE="Users API"`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{HodosConfig, PRODUCTION};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{DocsSettings, ErrorConfig, LogFormat, LogSettings, ServerEntry};
