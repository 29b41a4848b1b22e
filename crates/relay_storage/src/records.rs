//! Persisted records of model calls and tool executions.

use chrono::{DateTime, Utc};
use relay_core::{Message, RECORD_PREVIEW_CHARS, TraceContext, truncate_preview};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Maximum characters of encoded parameters kept in a [`ToolCallRecord`].
pub const TOOL_PARAMS_PREVIEW_CHARS: usize = 1000;

/// Maximum characters of tool output kept in a [`ToolCallRecord`].
pub const TOOL_RESULT_PREVIEW_CHARS: usize = 2000;

/// Status of a successful tool execution.
pub const TOOL_STATUS_SUCCESS: &str = "success";

/// Status of a failed tool execution.
pub const TOOL_STATUS_ERROR: &str = "error";

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A record type that can live in a [`crate::RecordStore`].
pub trait StoredRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Bucket holding this record type.
    const BUCKET: &'static str;

    /// Name of the identifier field, used in validation messages.
    const ID_FIELD: &'static str;

    /// Unique identifier.
    fn id(&self) -> &str;

    /// Correlation id; empty when the record was made outside a trace.
    fn trace_id(&self) -> &str;

    /// Owning agent loop; empty when none.
    fn loop_id(&self) -> &str;

    /// Start time, the chronological sort key.
    fn started_at(&self) -> DateTime<Utc>;

    /// Storage key: `"<trace_id>.<id>"`, or the bare id outside a trace.
    fn key(&self) -> String {
        if self.trace_id().is_empty() {
            self.id().to_string()
        } else {
            format!("{}.{}", self.trace_id(), self.id())
        }
    }
}

/// Outcome of one top-level completion call, fallbacks and retries included.
///
/// Written once when the call terminates and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Engine-assigned request identifier
    pub request_id: String,
    /// Correlation id
    #[serde(default)]
    pub trace_id: String,
    /// Owning agent loop
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub loop_id: String,
    /// Capability requested
    #[serde(default)]
    pub capability: String,
    /// Model that produced the terminal outcome
    #[serde(default)]
    pub model: String,
    /// Provider of that model
    #[serde(default)]
    pub provider: String,
    /// Conversation sent
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Full response text
    #[serde(default)]
    pub response: String,
    /// Response truncated for listings
    #[serde(default)]
    pub response_preview: String,
    /// Prompt tokens reported by the provider
    #[serde(default)]
    pub prompt_tokens: u64,
    /// Completion tokens reported by the provider
    #[serde(default)]
    pub completion_tokens: u64,
    /// Total tokens reported by the provider
    #[serde(default)]
    pub total_tokens: u64,
    /// Context window of the endpoint, when known
    #[serde(default, skip_serializing_if = "is_zero")]
    pub context_budget: u64,
    /// Whether the caller had to cut context to fit the budget
    #[serde(default, skip_serializing_if = "is_false")]
    pub context_truncated: bool,
    /// Provider finish reason
    #[serde(default)]
    pub finish_reason: String,
    /// When the call began
    pub started_at: DateTime<Utc>,
    /// When the call terminated
    pub completed_at: DateTime<Utc>,
    /// Wall-clock duration
    #[serde(default)]
    pub duration_ms: u64,
    /// Terminal error text for failed calls
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Retries across all candidates
    #[serde(default)]
    pub retries: u32,
    /// Candidates abandoned before the terminal outcome
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks_used: Vec<String>,
}

impl CallRecord {
    /// Set the full response and derive its preview.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_storage::CallRecord;
    ///
    /// let mut record = CallRecord::default();
    /// record.set_response("x".repeat(600));
    /// assert_eq!(record.response.len(), 600);
    /// assert_eq!(record.response_preview.len(), 503);
    /// ```
    pub fn set_response(&mut self, response: impl Into<String>) {
        self.response = response.into();
        self.response_preview = truncate_preview(&self.response, RECORD_PREVIEW_CHARS);
    }

    /// Whether the call ended in failure.
    pub fn is_error(&self) -> bool {
        !self.error.is_empty()
    }
}

impl StoredRecord for CallRecord {
    const BUCKET: &'static str = "LLM_CALLS";
    const ID_FIELD: &'static str = "request_id";

    fn id(&self) -> &str {
        &self.request_id
    }

    fn trace_id(&self) -> &str {
        &self.trace_id
    }

    fn loop_id(&self) -> &str {
        &self.loop_id
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

/// Outcome of one tool execution, kept for trajectory interleaving.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Tool call identifier
    pub call_id: String,
    /// Correlation id
    #[serde(default)]
    pub trace_id: String,
    /// Owning agent loop
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub loop_id: String,
    /// Tool executed
    #[serde(default)]
    pub tool_name: String,
    /// JSON-encoded parameters, truncated
    #[serde(default)]
    pub parameters: String,
    /// Tool output, truncated
    #[serde(default)]
    pub result: String,
    /// "success" or "error"
    #[serde(default)]
    pub status: String,
    /// Failure text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// When execution began
    pub started_at: DateTime<Utc>,
    /// When execution finished
    pub completed_at: DateTime<Utc>,
    /// Wall-clock duration
    #[serde(default)]
    pub duration_ms: u64,
}

impl ToolCallRecord {
    /// Record a finished tool execution.
    ///
    /// Parameters are encoded as JSON and truncated; `outcome` is the tool
    /// output on success or the failure text on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use relay_core::TraceContext;
    /// use relay_storage::ToolCallRecord;
    /// use serde_json::{Map, json};
    ///
    /// let mut params = Map::new();
    /// params.insert("path".into(), json!("README.md"));
    /// let now = Utc::now();
    /// let record = ToolCallRecord::from_execution(
    ///     "call-1",
    ///     "file_read",
    ///     &params,
    ///     Err("permission denied"),
    ///     &TraceContext::new("trace-1"),
    ///     now,
    ///     now,
    /// );
    /// assert_eq!(record.status, "error");
    /// assert_eq!(record.parameters, r#"{"path":"README.md"}"#);
    /// ```
    pub fn from_execution(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        parameters: &Map<String, Value>,
        outcome: Result<&str, &str>,
        trace: &TraceContext,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Self {
        let encoded = Value::Object(parameters.clone()).to_string();
        let (status, result, error) = match outcome {
            Ok(output) => (
                TOOL_STATUS_SUCCESS,
                truncate_preview(output, TOOL_RESULT_PREVIEW_CHARS),
                String::new(),
            ),
            Err(message) => (TOOL_STATUS_ERROR, String::new(), message.to_string()),
        };
        let duration_ms = (completed_at - started_at).num_milliseconds().max(0) as u64;

        Self {
            call_id: call_id.into(),
            trace_id: trace.trace_id.clone().unwrap_or_default(),
            loop_id: trace.loop_id.clone().unwrap_or_default(),
            tool_name: tool_name.into(),
            parameters: truncate_preview(&encoded, TOOL_PARAMS_PREVIEW_CHARS),
            result,
            status: status.to_string(),
            error,
            started_at,
            completed_at,
            duration_ms,
        }
    }
}

impl StoredRecord for ToolCallRecord {
    const BUCKET: &'static str = "TOOL_CALLS";
    const ID_FIELD: &'static str = "call_id";

    fn id(&self) -> &str {
        &self.call_id
    }

    fn trace_id(&self) -> &str {
        &self.trace_id
    }

    fn loop_id(&self) -> &str {
        &self.loop_id
    }

    fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
