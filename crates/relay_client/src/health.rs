//! Per-candidate circuit breaker.
//!
//! A candidate whose retries are spent on `failure_threshold` consecutive
//! calls is opened and skipped by the engine. Once the recovery timeout has
//! passed the circuit is half-open: calls reach the candidate again, and the
//! next outcome either closes the circuit or reopens it for another timeout.
//! Fatal failures say nothing about endpoint health and are not counted.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use relay_retry::HealthSettings;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Circuit position for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitState {
    /// Calls flow normally
    Closed,
    /// Calls are skipped until the recovery timeout passes
    Open,
    /// Recovery timeout passed; the next outcome decides
    HalfOpen,
}

/// Health snapshot of one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointHealth {
    /// Current circuit position
    pub circuit: CircuitState,
    /// Exhausted calls since the last success
    pub failure_count: u32,
    /// When the candidate last answered
    pub last_success: Option<DateTime<Utc>>,
    /// When the candidate last exhausted its retries
    pub last_failure: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
struct Status {
    failure_count: u32,
    last_success: Option<DateTime<Utc>>,
    last_failure: Option<DateTime<Utc>>,
    opened_at: Option<Instant>,
}

impl Status {
    fn circuit(&self, recovery: Duration) -> CircuitState {
        match self.opened_at {
            None => CircuitState::Closed,
            Some(opened) if opened.elapsed() >= recovery => CircuitState::HalfOpen,
            Some(_) => CircuitState::Open,
        }
    }
}

/// Tracks candidate health for the invocation engine.
///
/// Unknown candidates are healthy. Safe to share across concurrent calls.
///
/// # Examples
///
/// ```
/// use relay_client::{CircuitState, HealthTracker};
/// use relay_retry::HealthSettings;
/// use std::time::Duration;
///
/// let health = HealthTracker::new(HealthSettings::new(2, Duration::from_secs(30)));
/// health.mark_failure("qwen");
/// assert!(health.is_available("qwen"));
/// health.mark_failure("qwen");
/// assert_eq!(health.circuit("qwen"), CircuitState::Open);
/// assert!(!health.is_available("qwen"));
///
/// health.mark_success("qwen");
/// assert_eq!(health.circuit("qwen"), CircuitState::Closed);
/// ```
#[derive(Debug, Default)]
pub struct HealthTracker {
    settings: HealthSettings,
    statuses: RwLock<HashMap<String, Status>>,
}

impl HealthTracker {
    /// Tracker with the given threshold and recovery timeout.
    pub fn new(settings: HealthSettings) -> Self {
        Self {
            settings,
            statuses: RwLock::new(HashMap::new()),
        }
    }

    /// Threshold and recovery timeout in effect.
    pub fn settings(&self) -> &HealthSettings {
        &self.settings
    }

    /// Circuit position of `candidate`.
    pub fn circuit(&self, candidate: &str) -> CircuitState {
        self.statuses
            .read()
            .get(candidate)
            .map_or(CircuitState::Closed, |status| {
                status.circuit(self.settings.recovery_timeout())
            })
    }

    /// Whether calls may reach `candidate`; false only while open.
    pub fn is_available(&self, candidate: &str) -> bool {
        self.circuit(candidate) != CircuitState::Open
    }

    /// Snapshot for `candidate`, or `None` before any outcome was recorded.
    pub fn health(&self, candidate: &str) -> Option<EndpointHealth> {
        let recovery = self.settings.recovery_timeout();
        self.statuses
            .read()
            .get(candidate)
            .map(|status| EndpointHealth {
                circuit: status.circuit(recovery),
                failure_count: status.failure_count,
                last_success: status.last_success,
                last_failure: status.last_failure,
            })
    }

    /// Record an answered call, closing the circuit.
    pub fn mark_success(&self, candidate: &str) {
        let mut statuses = self.statuses.write();
        let status = statuses.entry(candidate.to_string()).or_default();
        if status.opened_at.take().is_some() {
            info!(candidate, "Circuit closed");
        }
        status.failure_count = 0;
        status.last_success = Some(Utc::now());
    }

    /// Record a call whose retries were all spent.
    ///
    /// Opens the circuit at the threshold; a failure while half-open
    /// reopens it for a fresh recovery timeout.
    pub fn mark_failure(&self, candidate: &str) {
        let mut statuses = self.statuses.write();
        let status = statuses.entry(candidate.to_string()).or_default();
        status.failure_count = status.failure_count.saturating_add(1);
        status.last_failure = Some(Utc::now());
        if status.failure_count >= self.settings.failure_threshold {
            if status.opened_at.is_none() {
                warn!(candidate, failures = status.failure_count, "Circuit opened");
            } else {
                debug!(candidate, "Circuit reopened");
            }
            status.opened_at = Some(Instant::now());
        }
    }

    /// Forget everything recorded for `candidate`.
    pub fn reset(&self, candidate: &str) {
        self.statuses.write().remove(candidate);
    }

    /// `chain` without open candidates, order preserved.
    ///
    /// When every candidate is open the full chain is returned, so a call
    /// still has something to try.
    pub fn available_chain(&self, chain: &[String]) -> Vec<String> {
        let available: Vec<String> = chain
            .iter()
            .filter(|candidate| self.is_available(candidate))
            .cloned()
            .collect();
        if available.is_empty() && !chain.is_empty() {
            debug!(candidates = chain.len(), "Every circuit open, trying full chain");
            return chain.to_vec();
        }
        available
    }
}
