//! Reconstructed trajectory views.

use chrono::{DateTime, Utc};
use relay_core::{ENTRY_PREVIEW_CHARS, LoopSnapshot, truncate_preview};
use relay_storage::{CallRecord, ToolCallRecord};
use serde::{Deserialize, Serialize};

fn is_zero(value: &u64) -> bool {
    *value == 0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}

/// Level of detail in a trajectory response.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    /// Aggregates only
    #[default]
    Summary,
    /// Aggregates plus the interleaved entry list
    Json,
}

/// Aggregated, chronologically ordered view of one loop or trace.
///
/// Computed on demand, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Agent loop, empty when the trace has no known loop
    #[serde(default)]
    pub loop_id: String,
    /// Correlation id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub trace_id: String,
    /// Loop iterations
    #[serde(default)]
    pub steps: u64,
    /// Tool executions
    #[serde(default)]
    pub tool_calls: usize,
    /// Model calls
    #[serde(default)]
    pub model_calls: usize,
    /// Prompt tokens across model calls
    #[serde(default)]
    pub tokens_in: u64,
    /// Completion tokens across model calls
    #[serde(default)]
    pub tokens_out: u64,
    /// Wall-clock duration of the loop when known, otherwise summed durations
    #[serde(default)]
    pub duration_ms: i64,
    /// Loop status
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Loop start
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// Loop end
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Interleaved entries, present for [`Format::Json`] only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<TrajectoryEntry>>,
}

/// One event in a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrajectoryEntry {
    /// A model call
    ModelCall(ModelCallEntry),
    /// A tool execution
    ToolCall(ToolCallEntry),
}

impl TrajectoryEntry {
    /// When the event started.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ModelCall(entry) => entry.timestamp,
            Self::ToolCall(entry) => entry.timestamp,
        }
    }
}

/// Model call summary inside a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCallEntry {
    /// Call start
    pub timestamp: DateTime<Utc>,
    /// Call duration
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration_ms: u64,
    /// Request id, for drill-down to the full record
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    /// Model that answered
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
    /// Provider of that model
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provider: String,
    /// Capability requested
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub capability: String,
    /// Prompt tokens
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tokens_in: u64,
    /// Completion tokens
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tokens_out: u64,
    /// Provider finish reason
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub finish_reason: String,
    /// Failure text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Retries across candidates
    #[serde(default, skip_serializing_if = "is_zero_u32")]
    pub retries: u32,
    /// Messages sent
    #[serde(default, skip_serializing_if = "is_zero_usize")]
    pub messages_count: usize,
    /// Truncated response text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub response_preview: String,
}

impl From<&CallRecord> for ModelCallEntry {
    fn from(call: &CallRecord) -> Self {
        let response = if call.response.is_empty() {
            &call.response_preview
        } else {
            &call.response
        };
        Self {
            timestamp: call.started_at,
            duration_ms: call.duration_ms,
            request_id: call.request_id.clone(),
            model: call.model.clone(),
            provider: call.provider.clone(),
            capability: call.capability.clone(),
            tokens_in: call.prompt_tokens,
            tokens_out: call.completion_tokens,
            finish_reason: call.finish_reason.clone(),
            error: call.error.clone(),
            retries: call.retries,
            messages_count: call.messages.len(),
            response_preview: truncate_preview(response, ENTRY_PREVIEW_CHARS),
        }
    }
}

/// Tool execution summary inside a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallEntry {
    /// Execution start
    pub timestamp: DateTime<Utc>,
    /// Execution duration
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration_ms: u64,
    /// Tool executed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tool_name: String,
    /// "success" or "error"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub status: String,
    /// Failure text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
    /// Truncated tool output
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result_preview: String,
}

impl From<&ToolCallRecord> for ToolCallEntry {
    fn from(tool: &ToolCallRecord) -> Self {
        Self {
            timestamp: tool.started_at,
            duration_ms: tool.duration_ms,
            tool_name: tool.tool_name.clone(),
            status: tool.status.clone(),
            error: tool.error.clone(),
            result_preview: truncate_preview(&tool.result, ENTRY_PREVIEW_CHARS),
        }
    }
}

impl Trajectory {
    /// Aggregate records under a loop snapshot.
    ///
    /// Tokens are summed over model calls. The duration is the loop's own
    /// wall-clock span when both its start and end are known, since calls may
    /// overlap or leave gaps; otherwise it is the sum of call and tool
    /// durations.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use relay_core::LoopSnapshot;
    /// use relay_storage::CallRecord;
    /// use relay_trajectory::{Format, Trajectory};
    ///
    /// let start = Utc::now();
    /// let snapshot = LoopSnapshot {
    ///     id: "loop-1".into(),
    ///     started_at: Some(start),
    ///     ended_at: Some(start + Duration::seconds(5)),
    ///     ..LoopSnapshot::default()
    /// };
    /// let call = CallRecord { duration_ms: 1500, prompt_tokens: 10, ..CallRecord::default() };
    ///
    /// let trajectory = Trajectory::build(&snapshot, &[call.clone(), call], &[], Format::Summary);
    /// assert_eq!(trajectory.duration_ms, 5000);
    /// assert_eq!(trajectory.tokens_in, 20);
    /// assert!(trajectory.entries.is_none());
    /// ```
    pub fn build(
        snapshot: &LoopSnapshot,
        calls: &[CallRecord],
        tools: &[ToolCallRecord],
        format: Format,
    ) -> Self {
        let summed: u64 = calls.iter().map(|c| c.duration_ms).sum::<u64>()
            + tools.iter().map(|t| t.duration_ms).sum::<u64>();
        let duration_ms = match (snapshot.started_at, snapshot.ended_at) {
            (Some(start), Some(end)) => (end - start).num_milliseconds(),
            _ => i64::try_from(summed).unwrap_or(i64::MAX),
        };

        let entries = (format == Format::Json).then(|| {
            let mut entries: Vec<TrajectoryEntry> = calls
                .iter()
                .map(|c| TrajectoryEntry::ModelCall(c.into()))
                .chain(tools.iter().map(|t| TrajectoryEntry::ToolCall(t.into())))
                .collect();
            entries.sort_by_key(TrajectoryEntry::timestamp);
            entries
        });

        Self {
            loop_id: snapshot.id.clone(),
            trace_id: snapshot.trace_id.clone(),
            steps: snapshot.iteration,
            tool_calls: tools.len(),
            model_calls: calls.len(),
            tokens_in: calls.iter().map(|c| c.prompt_tokens).sum(),
            tokens_out: calls.iter().map(|c| c.completion_tokens).sum(),
            duration_ms,
            status: snapshot.status.clone(),
            started_at: snapshot.started_at,
            ended_at: snapshot.ended_at,
            entries,
        }
    }
}
