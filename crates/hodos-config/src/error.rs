//! Configuration errors.

use std::path::PathBuf;
use thiserror::Error;

/// Why a configuration could not be loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The named file does not exist.
    #[error("no configuration file at {}", path.display())]
    Missing {
        /// The path that was tried.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("cannot read {}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// I/O cause.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML.
    #[error("bad TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON.
    #[error("bad JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed `.env` file.
    #[error("bad .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    /// Neither TOML nor JSON.
    #[error("unsupported configuration format `{0}` (expected toml or json)")]
    UnsupportedFormat(String),

    /// A field holds a value the framework cannot use.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted field path, e.g. `docs.title`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable could not be applied.
    #[error("environment variable {var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A cross-field check failed.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEnv {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ConfigError::missing("/etc/hodos.toml").to_string(),
            "no configuration file at /etc/hodos.toml"
        );
        assert_eq!(
            ConfigError::invalid_value("docs.title", "must not be empty").to_string(),
            "docs.title: must not be empty"
        );
        assert_eq!(
            ConfigError::invalid_env("HODOS_LOGGING__ENABLED", "expected boolean").to_string(),
            "environment variable HODOS_LOGGING__ENABLED: expected boolean"
        );
        assert_eq!(
            ConfigError::UnsupportedFormat("yaml".into()).to_string(),
            "unsupported configuration format `yaml` (expected toml or json)"
        );
    }
}
