//! Tests for building tool-call records from executions.

use chrono::{Duration, Utc};
use relay_core::TraceContext;
use relay_storage::{TOOL_STATUS_SUCCESS, ToolCallRecord};
use serde_json::{Map, json};

#[test]
fn test_success_truncates_large_output_and_parameters() {
    let mut params = Map::new();
    params.insert("blob".into(), json!("p".repeat(5000)));
    let started = Utc::now();
    let output = "r".repeat(3000);

    let record = ToolCallRecord::from_execution(
        "call-1",
        "file_read",
        &params,
        Ok(output.as_str()),
        &TraceContext::new("trace-1").with_loop("loop-1"),
        started,
        started + Duration::milliseconds(25),
    );

    assert_eq!(record.status, TOOL_STATUS_SUCCESS);
    assert_eq!(record.result.chars().count(), 2003);
    assert_eq!(record.parameters.chars().count(), 1003);
    assert_eq!(record.duration_ms, 25);
    assert_eq!(record.trace_id, "trace-1");
    assert_eq!(record.loop_id, "loop-1");
    assert!(record.error.is_empty());
}

#[test]
fn test_error_outcome_keeps_message() {
    let now = Utc::now();
    let record = ToolCallRecord::from_execution(
        "call-2",
        "git_status",
        &Map::new(),
        Err("not a git repository"),
        &TraceContext::default(),
        now,
        now,
    );

    assert_eq!(record.status, "error");
    assert_eq!(record.error, "not a git repository");
    assert_eq!(record.parameters, "{}");
    assert!(record.trace_id.is_empty());
}
