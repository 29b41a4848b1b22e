//! Tests for the HTTP query surface.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use chrono::Utc;
use relay_core::LoopSnapshot;
use relay_storage::{CallRecord, CallStore, ToolCallStore};
use relay_trajectory::{KvLoopStateStore, Reconstructor, api};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const TTL: Duration = Duration::from_secs(3600);

struct Fixture {
    calls: Arc<CallStore>,
    loops: Arc<KvLoopStateStore>,
    router: Router,
}

fn fixture(prefix: &str) -> Fixture {
    let calls = Arc::new(CallStore::in_memory(TTL));
    let loops = Arc::new(KvLoopStateStore::in_memory(TTL));
    let reconstructor = Reconstructor::new(
        calls.clone(),
        Arc::new(ToolCallStore::in_memory(TTL)),
        loops.clone(),
    );
    let state = api::ApiState::new(Arc::new(reconstructor));
    Fixture {
        calls,
        loops,
        router: api::create_router_with_prefix(prefix, state),
    }
}

fn call(request_id: &str, capability: &str, budget: u64, prompt_tokens: u64) -> CallRecord {
    let now = Utc::now();
    CallRecord {
        request_id: request_id.to_string(),
        trace_id: "trace-1".to_string(),
        loop_id: "loop-1".to_string(),
        capability: capability.to_string(),
        context_budget: budget,
        prompt_tokens,
        started_at: now,
        completed_at: now,
        ..CallRecord::default()
    }
}

async fn send(router: &Router, method: Method, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder().method(method).uri(uri).body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

async fn get(router: &Router, uri: &str) -> anyhow::Result<(StatusCode, Value)> {
    send(router, Method::GET, uri).await
}

#[tokio::test]
async fn test_loop_trajectory() -> anyhow::Result<()> {
    let f = fixture("");
    f.loops
        .put(&LoopSnapshot {
            id: "loop-1".to_string(),
            status: "running".to_string(),
            ..LoopSnapshot::default()
        })
        .await?;
    f.calls.store(&call("r1", "coding", 0, 10)).await?;

    let (status, body) = get(&f.router, "/loops/loop-1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["loop_id"], "loop-1");
    assert_eq!(body["model_calls"], 1);
    assert!(body.get("entries").is_none());

    let (status, body) = get(&f.router, "/loops/loop-1?format=json").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"][0]["type"], "model_call");
    Ok(())
}

#[tokio::test]
async fn test_trace_trajectory_under_prefix() -> anyhow::Result<()> {
    let f = fixture("/trajectory-api/");
    f.calls.store(&call("r1", "coding", 0, 10)).await?;

    let (status, body) = get(&f.router, "/trajectory-api/traces/trace-1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["trace_id"], "trace-1");
    assert_eq!(body["tokens_in"], 10);
    Ok(())
}

#[tokio::test]
async fn test_not_found() -> anyhow::Result<()> {
    let f = fixture("");
    let (status, body) = get(&f.router, "/loops/ghost").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "loop not found");

    let (status, body) = get(&f.router, "/traces/ghost").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "trace not found");

    let (status, _) = get(&f.router, "/calls/ghost").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_missing_ids_are_bad_requests() -> anyhow::Result<()> {
    let f = fixture("");
    for uri in ["/loops", "/loops/", "/traces/", "/calls/", "/loops/%20"] {
        let (status, body) = get(&f.router, uri).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().is_some_and(|e| e.ends_with("is required")), "{uri}");
    }
    Ok(())
}

#[tokio::test]
async fn test_unknown_format_is_a_bad_request() -> anyhow::Result<()> {
    let f = fixture("");
    let (status, body) = get(&f.router, "/traces/trace-1?format=xml").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid format: xml");
    Ok(())
}

#[tokio::test]
async fn test_wrong_method() -> anyhow::Result<()> {
    let f = fixture("");
    let (status, _) = send(&f.router, Method::POST, "/loops/loop-1").await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    let (status, _) = send(&f.router, Method::DELETE, "/context-stats").await?;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    Ok(())
}

#[tokio::test]
async fn test_call_drill_down() -> anyhow::Result<()> {
    let f = fixture("");
    let key = f.calls.store(&call("r1", "coding", 0, 10)).await?;
    assert_eq!(key, "trace-1.r1");

    let (status, body) = get(&f.router, "/calls/trace-1.r1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request_id"], "r1");
    assert_eq!(body["capability"], "coding");
    Ok(())
}

#[tokio::test]
async fn test_context_stats() -> anyhow::Result<()> {
    let f = fixture("");
    f.calls.store(&call("r1", "coding", 1000, 500)).await?;
    f.calls.store(&call("r2", "coding", 1000, 250)).await?;
    f.calls.store(&call("r3", "planning", 0, 900)).await?;

    let (status, _) = get(&f.router, "/context-stats").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&f.router, "/context-stats?trace_id=trace-1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_calls"], 3);
    assert_eq!(body["summary"]["calls_with_budget"], 2);
    assert_eq!(body["summary"]["total_used"], 750);
    assert_eq!(body["summary"]["avg_utilization"], 37.5);
    assert_eq!(body["by_capability"]["coding"]["max_utilization"], 50.0);
    assert!(body["by_capability"].get("planning").is_none());
    assert!(body.get("calls").is_none());

    let (status, body) =
        get(&f.router, "/context-stats?trace_id=trace-1&capability=planning&format=json").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["total_calls"], 1);
    assert_eq!(body["calls"], serde_json::json!([]));
    Ok(())
}
