//! Collaborator-facing types: resolved endpoints, loop snapshots and call correlation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A concrete model endpoint a capability candidate resolves to.
///
/// An empty `base_url` means "use the adapter's default".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    /// Adapter name, e.g. "anthropic" or "ollama"
    pub provider: String,
    /// Base URL override
    #[serde(default, alias = "url", skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    /// Model identifier sent on the wire
    pub model: String,
    /// Context window size, recorded as the call's context budget
    #[serde(default, alias = "max_tokens")]
    pub max_tokens_budget: u64,
}

impl Endpoint {
    /// Endpoint using the adapter's default base URL.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            base_url: String::new(),
            model: model.into(),
            max_tokens_budget: 0,
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the context budget.
    pub fn with_budget(mut self, max_tokens_budget: u64) -> Self {
        self.max_tokens_budget = max_tokens_budget;
        self
    }
}

/// Lifecycle snapshot of one agent loop.
///
/// # Examples
///
/// ```
/// use relay_core::LoopSnapshot;
///
/// let snapshot: LoopSnapshot = serde_json::from_str(
///     r#"{"id":"loop-1","status":"running","iteration":4}"#,
/// ).unwrap();
/// assert_eq!(snapshot.iteration, 4);
/// assert!(snapshot.ended_at.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopSnapshot {
    /// Loop identifier
    #[serde(default)]
    pub id: String,
    /// Trace the loop belongs to
    #[serde(default)]
    pub trace_id: String,
    /// Lifecycle status, e.g. "running" or "complete"
    #[serde(default)]
    pub status: String,
    /// Agent role driving the loop
    #[serde(default)]
    pub role: String,
    /// Model the loop was configured with
    #[serde(default)]
    pub model: String,
    /// Iterations completed so far
    #[serde(default)]
    pub iteration: u64,
    /// When the loop started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the loop ended, if it has
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Correlation identifiers attached to a call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceContext {
    /// Caller-supplied correlation id
    pub trace_id: Option<String>,
    /// Agent loop issuing the call
    pub loop_id: Option<String>,
}

impl TraceContext {
    /// Context for a trace.
    pub fn new(trace_id: impl Into<String>) -> Self {
        Self {
            trace_id: Some(trace_id.into()),
            loop_id: None,
        }
    }

    /// Attach a loop id.
    pub fn with_loop(mut self, loop_id: impl Into<String>) -> Self {
        self.loop_id = Some(loop_id.into());
        self
    }
}
