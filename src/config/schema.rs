//! Configuration schema definitions.
//!
//! This module defines the configuration consumed by the persistence core.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};

/// Root configuration for the pooling daemon's durable state.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Path of the pid file.
    pub pid_file_name: PathBuf,

    /// Directory holding the backend status snapshot.
    pub logdir: PathBuf,

    /// Throw away the previous backend status snapshot at startup.
    pub discard_status: bool,

    /// Backend server definitions, in ordinal order.
    pub backends: Vec<BackendConfig>,

    /// Logging settings.
    pub logging: LoggingConfig,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            pid_file_name: PathBuf::from("/var/run/pool/pool.pid"),
            logdir: PathBuf::from("/var/log/pool"),
            discard_status: false,
            backends: Vec::new(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Backend server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend identifier.
    pub name: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error).
    pub level: String,

    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: PoolConfig = toml::from_str(r#"logdir = "/tmp/pool""#).unwrap();
        assert_eq!(config.logdir, PathBuf::from("/tmp/pool"));
        assert_eq!(config.pid_file_name, PathBuf::from("/var/run/pool/pool.pid"));
        assert!(!config.discard_status);
        assert!(config.backends.is_empty());
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_backends_in_order() {
        let config: PoolConfig = toml::from_str(
            r#"
            [logging]
            format = "json"

            [[backends]]
            name = "primary"

            [[backends]]
            name = "replica"
            "#,
        )
        .unwrap();

        assert_eq!(config.backends.len(), 2);
        assert_eq!(config.backends[0].name, "primary");
        assert_eq!(config.backends[1].name, "replica");
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
