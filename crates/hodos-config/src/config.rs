//! The root configuration type.

use serde::{Deserialize, Serialize};

use crate::schema::{DocsSettings, ErrorConfig, LogFormat, LogSettings};
use crate::ConfigError;

/// Environment name that counts as production.
pub const PRODUCTION: &str = "production";

/// Complete hodos application configuration.
///
/// ```
/// use hodos_config::HodosConfig;
///
/// let config = HodosConfig::default();
/// assert_eq!(config.environment, "development");
/// assert!(config.include_internal_errors());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HodosConfig {
    /// Deployment environment (`development`, `staging`, `production`, ...).
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Error envelope settings.
    #[serde(default)]
    pub errors: ErrorConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LogSettings,

    /// OpenAPI document settings.
    #[serde(default)]
    pub docs: DocsSettings,
}

impl Default for HodosConfig {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            errors: ErrorConfig::default(),
            logging: LogSettings::default(),
            docs: DocsSettings::default(),
        }
    }
}

impl HodosConfig {
    /// Local development: pretty debug logs, internal errors exposed.
    #[must_use]
    pub fn development() -> Self {
        Self {
            environment: default_environment(),
            logging: LogSettings {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
                span_events: true,
                file_line_info: true,
                ..LogSettings::default()
            },
            ..Self::default()
        }
    }

    /// Production: JSON info logs, internal errors redacted.
    #[must_use]
    pub fn production() -> Self {
        Self {
            environment: PRODUCTION.to_string(),
            logging: LogSettings::default(),
            ..Self::default()
        }
    }

    /// True when running in production.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case(PRODUCTION)
    }

    /// Whether untrusted error messages reach clients.
    ///
    /// Defaults to `true` outside production and `false` in production.
    pub fn include_internal_errors(&self) -> bool {
        self.errors
            .include_internal_errors
            .unwrap_or(!self.is_production())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.trim().is_empty() {
            return Err(ConfigError::invalid_value("environment", "must not be empty"));
        }
        if self.docs.title.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.title", "must not be empty"));
        }
        if self.docs.version.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.version", "must not be empty"));
        }
        if let Some(directive) = self.logging.unknown_level() {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown log level in `{directive}`"),
            ));
        }
        if let Some(server) = self.docs.servers.iter().find(|s| s.url.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "docs.servers entry has an empty url{}",
                server
                    .description
                    .as_deref()
                    .map(|d| format!(" ({d})"))
                    .unwrap_or_default()
            )));
        }
        Ok(())
    }
}

fn default_environment() -> String {
    "development".to_string()
}
