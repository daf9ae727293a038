// src/observability/mod.rs
//! Tracing and metrics initialisation
//!
//! Library code only emits `tracing` events and `metrics` samples; binaries
//! decide where they go by calling these once at startup.

use crate::utils::config::{LoggingConfig, MetricsConfig};
use crate::utils::errors::{RedirectError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| RedirectError::ConfigError(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().with_target(false)).try_init()
    };

    result.map_err(|e| RedirectError::ConfigError(format!("Tracing already initialised: {}", e)))
}

/// Install the Prometheus metrics recorder
///
/// Returns `None` when metrics are disabled.
pub fn init_metrics(config: &MetricsConfig) -> Result<Option<PrometheusHandle>> {
    if !config.enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| RedirectError::ConfigError(format!("Failed to install metrics recorder: {}", e)))?;
    Ok(Some(handle))
}
