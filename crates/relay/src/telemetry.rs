//! Tracing subscriber setup.

use relay_error::{ConfigError, RelayResult};
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,relay=debug";

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directives used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable text
    pub json_logs: bool,
    /// Include the event target in each line
    pub with_target: bool,
}

impl TelemetryConfig {
    /// Configuration taking its filter from `RUST_LOG` when set.
    pub fn new() -> Self {
        Self {
            log_level: env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string()),
            json_logs: false,
            with_target: true,
        }
    }

    /// Set the fallback filter directives.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable JSON-formatted logs.
    pub fn with_json_logs(mut self, enabled: bool) -> Self {
        self.json_logs = enabled;
        self
    }

    /// Include or omit event targets.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Install a human-readable subscriber filtered by `RUST_LOG`.
pub fn init_tracing() -> RelayResult<()> {
    init_tracing_with_config(TelemetryConfig::default())
}

/// Install a subscriber with custom configuration.
///
/// Fails when the filter directives are invalid or a global subscriber is
/// already installed.
pub fn init_tracing_with_config(config: TelemetryConfig) -> RelayResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| {
            ConfigError::new(format!(
                "invalid log filter {:?}: {}",
                config.log_level, e
            ))
        })?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(config.with_target)
            .with_level(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(config.with_target)
            .with_level(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("install tracing subscriber: {}", e)))?;

    info!(json = config.json_logs, "Tracing initialized");
    Ok(())
}
