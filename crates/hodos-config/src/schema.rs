//! Configuration sections.

use hodos_telemetry::logging::LEVELS;
use hodos_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Error envelope settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ErrorConfig {
    /// Expose messages of untrusted errors in responses.
    ///
    /// Unset means "outside production only".
    #[serde(default)]
    pub include_internal_errors: Option<bool>,
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LogSettings {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive: a level, or `target=level` pairs separated by commas.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Emit span open/close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub file_line_info: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            span_events: false,
            file_line_info: false,
        }
    }
}

impl LogSettings {
    /// Returns the first directive whose level is not recognised.
    pub(crate) fn unknown_level(&self) -> Option<&str> {
        self.level
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .find(|directive| {
                let level = directive.rsplit_once('=').map_or(*directive, |(_, l)| l);
                !LEVELS.contains(&level.to_ascii_lowercase().as_str())
            })
    }

    /// Converts the settings into a logging setup for `service_name`.
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            json_format: self.format == LogFormat::Json,
            span_events: self.span_events,
            file_line_info: self.file_line_info,
            service_name: service_name.to_string(),
            ..LogConfig::default()
        }
    }
}

/// A server advertised in generated documentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerEntry {
    /// Server URL.
    pub url: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
}

/// OpenAPI document settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DocsSettings {
    /// Document title.
    #[serde(default = "default_title")]
    pub title: String,

    /// API version.
    #[serde(default = "default_version")]
    pub version: String,

    /// Document description.
    #[serde(default)]
    pub description: Option<String>,

    /// Advertised servers.
    #[serde(default)]
    pub servers: Vec<ServerEntry>,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            version: default_version(),
            description: None,
            servers: Vec::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_title() -> String {
    "hodos".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level() {
        let mut settings = LogSettings::default();
        assert_eq!(settings.unknown_level(), None);

        settings.level = "hodos_routes=debug,WARN".to_string();
        assert_eq!(settings.unknown_level(), None);

        settings.level = "info,hodos=loud".to_string();
        assert_eq!(settings.unknown_level(), Some("hodos=loud"));
    }

    #[test]
    fn test_to_log_config() {
        let settings = LogSettings {
            format: LogFormat::Pretty,
            level: "debug".to_string(),
            ..LogSettings::default()
        };
        let config = settings.to_log_config("users-api");
        assert!(!config.json_format);
        assert_eq!(config.level, "debug");
        assert_eq!(config.service_name, "users-api");
    }
}
