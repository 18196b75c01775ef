//! Telemetry error types.

use thiserror::Error;

/// Errors raised while installing logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber is already installed, or installation failed.
    #[error("cannot install log subscriber: {0}")]
    SubscriberInstall(String),

    /// The filter directive does not parse.
    #[error("invalid log filter `{filter}`: {reason}")]
    InvalidFilter {
        /// The rejected directive.
        filter: String,
        /// Parser message.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::InvalidFilter {
            filter: "hodos=loud".to_string(),
            reason: "invalid level".to_string(),
        };
        assert_eq!(err.to_string(), "invalid log filter `hodos=loud`: invalid level");
    }
}
