//! Configuration for retry policy, the HTTP client, the call store, endpoint
//! health tracking and the static capability registry.
//!
//! Configuration sources, later overriding earlier:
//! - Bundled defaults (include_str! from relay.toml)
//! - User config in home directory (~/.config/relay/relay.toml)
//! - User config in current directory (./relay.toml)

use config::{Config, File, FileFormat};
use relay_core::Endpoint;
use relay_error::{ConfigError, RelayError, RelayResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bounded exponential backoff policy for one candidate endpoint.
///
/// # Examples
///
/// ```
/// use relay_retry::RetryPolicy;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts, 3);
/// assert!(policy.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Attempts per candidate, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt, in milliseconds
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Growth factor applied per further attempt
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound on the un-jittered delay, in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

/// Largest accepted `retry.max_backoff_ms`: one day.
pub const MAX_BACKOFF_LIMIT_MS: u64 = 24 * 60 * 60 * 1_000;

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

impl RetryPolicy {
    /// Policy from durations.
    pub fn new(max_attempts: u32, base: Duration, multiplier: f64, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base_ms: base.as_millis() as u64,
            backoff_multiplier: multiplier,
            max_backoff_ms: max_backoff.as_millis() as u64,
        }
    }

    /// Delay before the second attempt.
    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }

    /// Cap on the un-jittered delay.
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    /// Reject policies that could never make an attempt or would shrink delays.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::new("retry.max_attempts must be at least 1"));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ConfigError::new(format!(
                "retry.backoff_multiplier must be a finite value >= 1.0, got {}",
                self.backoff_multiplier
            )));
        }
        if self.max_backoff_ms > MAX_BACKOFF_LIMIT_MS {
            return Err(ConfigError::new(format!(
                "retry.max_backoff_ms ({}) exceeds the limit of {}",
                self.max_backoff_ms, MAX_BACKOFF_LIMIT_MS
            )));
        }
        if self.max_backoff_ms < self.backoff_base_ms {
            return Err(ConfigError::new(format!(
                "retry.max_backoff_ms ({}) is below retry.backoff_base_ms ({})",
                self.max_backoff_ms, self.backoff_base_ms
            )));
        }
        Ok(())
    }
}

/// HTTP client settings for provider calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Largest response body read from a provider
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

fn default_timeout_secs() -> u64 {
    180
}

fn default_max_response_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_response_bytes: default_max_response_bytes(),
        }
    }
}

impl ClientSettings {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Call store settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Record lifetime in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Directory for the filesystem backend; in-memory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            path: None,
        }
    }
}

impl StoreSettings {
    /// Record lifetime.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Endpoint circuit breaker settings.
///
/// A candidate whose retries are spent `failure_threshold` calls in a row is
/// skipped until `recovery_timeout_ms` has passed, after which it is tried
/// again (half-open).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSettings {
    /// Consecutive exhausted calls that open the circuit
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    /// How long an open circuit rejects calls, in milliseconds
    #[serde(default = "default_recovery_timeout_ms")]
    pub recovery_timeout_ms: u64,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_recovery_timeout_ms() -> u64 {
    30_000
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            recovery_timeout_ms: default_recovery_timeout_ms(),
        }
    }
}

impl HealthSettings {
    /// Settings from a threshold and a recovery timeout.
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout_ms: recovery_timeout.as_millis() as u64,
        }
    }

    /// How long an open circuit rejects calls.
    pub fn recovery_timeout(&self) -> Duration {
        Duration::from_millis(self.recovery_timeout_ms)
    }

    /// A zero threshold would open circuits that never saw a failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::new("health.failure_threshold must be at least 1"));
        }
        Ok(())
    }
}

/// Model preferences for one capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityConfig {
    /// What the capability is for
    #[serde(default)]
    pub description: String,
    /// Candidates in order of preference
    #[serde(default)]
    pub preferred: Vec<String>,
    /// Candidates tried after every preferred one
    #[serde(default)]
    pub fallback: Vec<String>,
}

/// Static capability registry contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Capability name to preferences
    #[serde(default)]
    pub capabilities: HashMap<String, CapabilityConfig>,
    /// Candidate name to endpoint
    #[serde(default)]
    pub endpoints: HashMap<String, Endpoint>,
    /// Candidate used for capabilities with no entry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

/// Top-level relay configuration.
///
/// # Example
///
/// ```no_run
/// use relay_retry::RelayConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RelayConfig::load()?;
/// println!("attempts per endpoint: {}", config.retry.max_attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Retry policy
    #[serde(default)]
    pub retry: RetryPolicy,
    /// HTTP client settings
    #[serde(default)]
    pub client: ClientSettings,
    /// Call store settings
    #[serde(default)]
    pub store: StoreSettings,
    /// Endpoint circuit breaker settings
    #[serde(default)]
    pub health: HealthSettings,
    /// Static capability registry, if configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,
}

impl RelayConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> RelayResult<Self> {
        debug!("Loading configuration from file");

        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                RelayError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?;
        Self::finish(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(toml: &str) -> RelayResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .map_err(|e| {
                RelayError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?;
        Self::finish(config)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and silently skipped when absent.
    #[instrument]
    pub fn load() -> RelayResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        const DEFAULT_CONFIG: &str = include_str!("../../../relay.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/relay/relay.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("relay").required(false));

        let config = builder.build().map_err(|e| {
            RelayError::from(ConfigError::new(format!(
                "Failed to build configuration: {}",
                e
            )))
        })?;
        Self::finish(config)
    }

    fn finish(config: Config) -> RelayResult<Self> {
        let parsed: Self = config.try_deserialize().map_err(|e| {
            RelayError::from(ConfigError::new(format!(
                "Failed to parse configuration: {}",
                e
            )))
        })?;
        parsed.retry.validate()?;
        parsed.health.validate()?;
        Ok(parsed)
    }
}
