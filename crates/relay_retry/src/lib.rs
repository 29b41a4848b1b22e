//! Retry policy, error classification and configuration for relay.
//!
//! This crate provides the leaf components of the invocation engine:
//! - [`classify`]: tags provider failures Transient or Fatal
//! - [`backoff_delay`]: jittered exponential delay between attempts
//! - [`RelayConfig`]: TOML configuration with bundled defaults and user overrides

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backoff;
mod classifier;
mod config;

pub use backoff::{JITTER_MAX, JITTER_MIN, backoff_delay, nominal_delay};
pub use classifier::{classify, classify_status, transport_error_kind};
pub use config::{
    CapabilityConfig, ClientSettings, HealthSettings, MAX_BACKOFF_LIMIT_MS, RegistryConfig,
    RelayConfig, RetryPolicy, StoreSettings,
};
