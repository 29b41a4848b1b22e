//! Tests for typed record stores.

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use relay_core::Message;
use relay_error::{RelayErrorKind, ValidationErrorKind};
use relay_storage::{
    CallRecord, CallStore, DEFAULT_RECORD_TTL, KeyValueBucket, ToolCallRecord, ToolCallStore,
};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0)
        .single()
        .expect("valid timestamp")
}

fn record(request_id: &str, trace_id: &str, started: i64) -> CallRecord {
    CallRecord {
        request_id: request_id.to_string(),
        trace_id: trace_id.to_string(),
        capability: "coding".to_string(),
        model: "qwen".to_string(),
        provider: "ollama".to_string(),
        started_at: at(started),
        completed_at: at(started + 1),
        duration_ms: 1000,
        ..Default::default()
    }
}

fn missing_id(err: &relay_error::RelayError) -> Option<&'static str> {
    match err.kind() {
        RelayErrorKind::Validation(v) => match v.kind() {
            ValidationErrorKind::MissingId(field) => Some(*field),
            _ => None,
        },
        _ => None,
    }
}

#[tokio::test]
async fn test_round_trip_preserves_every_field() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    let mut original = CallRecord {
        request_id: "req".into(),
        trace_id: "trace".into(),
        loop_id: "loop-7".into(),
        capability: "planning".into(),
        model: "claude-opus".into(),
        provider: "anthropic".into(),
        messages: vec![Message::system("plan"), Message::user("go")],
        prompt_tokens: 120,
        completion_tokens: 30,
        total_tokens: 150,
        context_budget: 200_000,
        context_truncated: true,
        finish_reason: "end_turn".into(),
        started_at: at(0),
        completed_at: at(2),
        duration_ms: 2000,
        error: String::new(),
        retries: 2,
        fallbacks_used: vec!["claude-sonnet".into()],
        ..Default::default()
    };
    original.set_response("The plan.");

    let key = store.store(&original).await?;
    assert_eq!(key, "trace.req");

    let fetched = store.get("trace.req").await?.expect("stored record");
    assert_eq!(fetched, original);
    Ok(())
}

#[tokio::test]
async fn test_key_without_trace_is_bare_id() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    let key = store.store(&record("req-9", "", 0)).await?;
    assert_eq!(key, "req-9");
    assert!(store.get("req-9").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_store_requires_id() {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    let err = store.store(&record("", "trace", 0)).await.unwrap_err();
    assert_eq!(missing_id(&err), Some("request_id"));
}

#[tokio::test]
async fn test_get_absent_key_is_none() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    assert!(store.get("nope").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_get_by_trace_filters_and_sorts() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    // Stored out of order on purpose
    store.store(&record("req-3", "T", 30)).await?;
    store.store(&record("req-1", "T", 10)).await?;
    store.store(&record("req-other", "other", 5)).await?;
    store.store(&record("req-2", "T", 20)).await?;

    let records = store.get_by_trace("T").await?;
    let ids: Vec<&str> = records.iter().map(|r| r.request_id.as_str()).collect();
    assert_eq!(ids, vec!["req-1", "req-2", "req-3"]);
    Ok(())
}

#[tokio::test]
async fn test_get_by_trace_does_not_match_longer_trace_ids() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    store.store(&record("req-1", "T", 0)).await?;
    store.store(&record("req-2", "T2", 0)).await?;

    assert_eq!(store.get_by_trace("T").await?.len(), 1);
    assert!(store.get_by_trace("missing").await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_get_by_trace_excludes_dotted_child_traces() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    store.store(&record("req-1", "T", 0)).await?;
    store.store(&record("req-2", "T.sub", 1)).await?;

    let parent = store.get_by_trace("T").await?;
    assert_eq!(parent.len(), 1);
    assert_eq!(parent[0].request_id, "req-1");

    let child = store.get_by_trace("T.sub").await?;
    assert_eq!(child.len(), 1);
    assert_eq!(child[0].request_id, "req-2");
    Ok(())
}

#[tokio::test]
async fn test_empty_ids_are_validation_errors() {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);

    let err = store.get_by_trace("").await.unwrap_err();
    assert_eq!(missing_id(&err), Some("trace_id"));

    let err = store.get_by_loop("").await.unwrap_err();
    assert_eq!(missing_id(&err), Some("loop_id"));
}

#[tokio::test]
async fn test_get_by_loop_scans_all_traces() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    for (id, trace, started, loop_id) in [
        ("a", "t1", 20, "loop-1"),
        ("b", "t2", 10, "loop-1"),
        ("c", "t1", 5, "loop-2"),
        ("d", "", 15, "loop-1"),
    ] {
        let mut r = record(id, trace, started);
        r.loop_id = loop_id.to_string();
        store.store(&r).await?;
    }

    let ids: Vec<String> = store
        .get_by_loop("loop-1")
        .await?
        .into_iter()
        .map(|r| r.request_id)
        .collect();
    assert_eq!(ids, vec!["b", "d", "a"]);
    Ok(())
}

#[tokio::test]
async fn test_scan_skips_undecodable_entries() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    store.store(&record("req-1", "T", 0)).await?;
    store.bucket().put("T.garbage", b"not json".to_vec()).await?;

    let records = store.get_by_trace("T").await?;
    assert_eq!(records.len(), 1);
    assert!(store.get("T.garbage").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_delete_removes_record() -> anyhow::Result<()> {
    let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
    let key = store.store(&record("req-1", "T", 0)).await?;
    store.delete(&key).await?;
    assert!(store.get(&key).await?.is_none());
    store.delete(&key).await?;
    Ok(())
}

#[tokio::test]
async fn test_optional_fields_are_omitted_from_json() -> anyhow::Result<()> {
    let value = serde_json::to_value(record("req-1", "T", 0))?;
    for omitted in ["loop_id", "context_budget", "context_truncated", "error", "fallbacks_used"] {
        assert!(value.get(omitted).is_none(), "{omitted} should be omitted");
    }
    for present in ["request_id", "trace_id", "retries", "duration_ms", "started_at"] {
        assert!(value.get(present).is_some(), "{present} should be present");
    }
    Ok(())
}

#[test]
fn test_response_preview_is_truncated() {
    let mut r = record("req-1", "T", 0);
    r.set_response("é".repeat(600));
    assert_eq!(r.response.chars().count(), 600);
    assert_eq!(r.response_preview.chars().count(), 503);
    assert!(r.response_preview.ends_with("..."));
}

#[tokio::test]
async fn test_tool_call_store_uses_call_id() -> anyhow::Result<()> {
    let store = ToolCallStore::in_memory(DEFAULT_RECORD_TTL);
    assert_eq!(store.bucket().name(), "TOOL_CALLS");

    let started = at(0);
    let record = ToolCallRecord {
        call_id: "call-1".into(),
        trace_id: "T".into(),
        tool_name: "file_read".into(),
        status: "success".into(),
        started_at: started,
        completed_at: started + ChronoDuration::milliseconds(40),
        duration_ms: 40,
        ..Default::default()
    };
    assert_eq!(store.store(&record).await?, "T.call-1");
    assert_eq!(store.get_by_trace("T").await?, vec![record]);

    let err = store.store(&ToolCallRecord::default()).await.unwrap_err();
    assert_eq!(missing_id(&err), Some("call_id"));
    Ok(())
}
