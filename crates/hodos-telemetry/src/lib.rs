//! Logging and metrics for hodos applications.
//!
//! Logging goes through `tracing-subscriber`: JSON lines in production,
//! pretty output in development (see [`LogConfig`]). Request counts and
//! latencies go through the `metrics` facade; the application installs
//! whichever recorder it wants.
//!
//! ```rust,no_run
//! use hodos_telemetry::{describe_metrics, init_logging, LogConfig};
//!
//! # fn main() -> hodos_telemetry::TelemetryResult<()> {
//! init_logging(&LogConfig::for_environment("production"))?;
//! describe_metrics();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{describe_metrics, record_error, record_request};

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
