// src/utils/config.rs
//! Configuration loading
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional config file (`sentra-redirect.{toml,yaml,json}` or an explicit path)
//! 3. Environment variables prefixed `SENTRA_REDIRECT__`, e.g.
//!    `SENTRA_REDIRECT__LOGGING__LEVEL=debug`

use crate::redirection::RedirectorConfig;
use crate::utils::errors::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_FILE: &str = "sentra-redirect";
const ENV_PREFIX: &str = "SENTRA_REDIRECT";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,

    /// Emit JSON lines instead of human-readable output
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

/// Metrics configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder
    pub enabled: bool,
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
    pub redirector: RedirectorConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
}

impl RedirectConfig {
    /// Load from the default file (if present) and the environment
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(DEFAULT_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load from an explicit file and the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix(ENV_PREFIX).prefix_separator("__").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
