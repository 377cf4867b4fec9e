//! Service configuration
//!
//! Layered with the `config` crate: an optional file (`maintenance.toml`, or
//! the path in `MAINTENANCE_CONFIG`) under `MAINTENANCE_*` environment
//! variables, where `__` separates nested keys, e.g.
//! `MAINTENANCE_ARTIFACT__DIR=/srv/models`.

use alerting::AlertConfig;
use data_validator::ValidationConfig;
use inference_engine::{ArtifactPaths, BatchConfig};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "MAINTENANCE_CONFIG";

const DEFAULT_CONFIG_FILE: &str = "maintenance";

/// Full service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifact: ArtifactPaths,
    pub alerting: AlertConfig,
    pub inference: BatchConfig,
    pub validation: ValidationConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0:5000)
    pub bind: String,
    /// Export Prometheus metrics at /metrics (default: true)
    pub metrics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:5000".to_string(),
            metrics: true,
        }
    }
}

/// Prediction history settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Retained predictions (default: 10000)
    pub capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            capacity: storage::DEFAULT_CAPACITY,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (default: info)
    pub level: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load from the default file location and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load_from(Some(Path::new(&path)), true),
            Err(_) => Self::load_from(None, true),
        }
    }

    /// Load from `path` (or `maintenance.*` when absent), optionally layering
    /// environment variables on top
    pub fn load_from(path: Option<&Path>, with_env: bool) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut builder = config::Config::builder().add_source(file);
        if with_env {
            builder = builder.add_source(
                config::Environment::with_prefix("MAINTENANCE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        builder.build()?.try_deserialize()
    }
}
