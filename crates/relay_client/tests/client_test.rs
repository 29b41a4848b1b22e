//! Engine tests against mock provider servers.

use relay_client::{CallContext, RelayClient, StaticCapabilityRegistry};
use relay_core::{CompletionRequest, Endpoint, Message, TraceContext};
use relay_error::{ProviderErrorKind, RelayError, RelayErrorKind, ValidationErrorKind};
use relay_models::{AdapterRegistry, OllamaAdapter};
use relay_retry::{CapabilityConfig, RetryPolicy};
use relay_storage::{CallRecord, CallStore};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TRACE: &str = "trace-1";

fn fast_policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(5), 2.0, Duration::from_millis(20))
}

fn ok_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "model": "qwen2.5-coder:14b",
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
    })
}

fn registry(server: &MockServer, candidates: &[&str]) -> StaticCapabilityRegistry {
    let registry = StaticCapabilityRegistry::default();
    registry.set_capability(
        "coding",
        CapabilityConfig {
            description: "Code".to_string(),
            preferred: candidates.iter().map(|c| c.to_string()).collect(),
            fallback: Vec::new(),
        },
    );
    for name in ["a", "b"] {
        registry.set_endpoint(
            name,
            Endpoint::new("ollama", format!("model-{name}"))
                .with_base_url(format!("{}/{}", server.uri(), name))
                .with_budget(128_000),
        );
    }
    registry
}

fn client(
    registry: StaticCapabilityRegistry,
    policy: RetryPolicy,
) -> anyhow::Result<(RelayClient, Arc<CallStore>)> {
    let adapters = AdapterRegistry::new();
    adapters.register(Arc::new(OllamaAdapter::with_api_key("")));
    let store = Arc::new(CallStore::in_memory(Duration::from_secs(60)));
    let client = RelayClient::builder(Arc::new(registry))
        .adapters(Arc::new(adapters))
        .retry_policy(policy)
        .call_store(store.clone())
        .build()?;
    Ok((client, store))
}

fn request() -> CompletionRequest {
    CompletionRequest::new("coding", vec![Message::user("write a function")])
}

fn ctx() -> CallContext {
    CallContext::new().with_trace(TraceContext::new(TRACE).with_loop("loop-1"))
}

async fn mount(server: &MockServer, candidate: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{candidate}/chat/completions")))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

/// Records are written in the background; poll until one shows up.
async fn recorded(store: &CallStore) -> anyhow::Result<CallRecord> {
    for _ in 0..200 {
        if let Some(record) = store.get_by_trace(TRACE).await?.into_iter().next() {
            return Ok(record);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    anyhow::bail!("no call record written")
}

fn provider_kind(err: &RelayError) -> Option<&ProviderErrorKind> {
    match err.kind() {
        RelayErrorKind::Classified(e) => Some(e.cause().kind()),
        RelayErrorKind::Exhaustion(e) => Some(e.last().cause().kind()),
        _ => None,
    }
}

#[tokio::test]
async fn test_success_returns_response_and_records_call() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "a", ResponseTemplate::new(200).set_body_json(ok_body("fn f() {}")), 1).await;
    let (client, store) = client(registry(&server, &["a", "b"]), fast_policy())?;

    let response = client.complete(&ctx(), request()).await?;
    assert_eq!(response.content, "fn f() {}");
    assert_eq!(response.usage.total_tokens, 16);
    assert!(!response.request_id.is_empty());

    let record = recorded(&store).await?;
    assert_eq!(record.request_id, response.request_id);
    assert_eq!(record.loop_id, "loop-1");
    assert_eq!(record.capability, "coding");
    assert_eq!(record.provider, "ollama");
    assert_eq!(record.response, "fn f() {}");
    assert_eq!(record.prompt_tokens, 12);
    assert_eq!(record.context_budget, 128_000);
    assert_eq!(record.finish_reason, "stop");
    assert_eq!(record.retries, 0);
    assert!(record.fallbacks_used.is_empty());
    assert!(!record.is_error());

    let key = format!("{}.{}", TRACE, response.request_id);
    assert!(store.get(&key).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_transient_failure_is_retried() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/a/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount(&server, "a", ResponseTemplate::new(200).set_body_json(ok_body("done")), 1).await;
    let (client, store) = client(registry(&server, &["a"]), fast_policy())?;

    let response = client.complete(&ctx(), request()).await?;
    assert_eq!(response.content, "done");

    let record = recorded(&store).await?;
    assert_eq!(record.retries, 1);
    assert!(record.fallbacks_used.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_fatal_error_aborts_the_chain() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "a", ResponseTemplate::new(401).set_body_string("bad key"), 1).await;
    mount(&server, "b", ResponseTemplate::new(200).set_body_json(ok_body("unused")), 0).await;
    let (client, store) = client(registry(&server, &["a", "b"]), fast_policy())?;

    let err = client
        .complete(&ctx(), request())
        .await
        .expect_err("401 must fail");
    let classified = err.as_classified().expect("classified error");
    assert!(classified.is_fatal());
    assert_eq!(classified.cause().kind().status(), Some(401));

    let record = recorded(&store).await?;
    assert!(record.error.contains("status 401"));
    assert_eq!(record.model, "a");
    assert_eq!(record.fallbacks_used, vec!["a"]);
    assert_eq!(record.retries, 0);
    Ok(())
}

#[tokio::test]
async fn test_exhausted_candidate_falls_back() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "a", ResponseTemplate::new(503), 3).await;
    mount(&server, "b", ResponseTemplate::new(200).set_body_json(ok_body("from b")), 1).await;
    let (client, store) = client(registry(&server, &["a", "b"]), fast_policy())?;

    let response = client.complete(&ctx(), request()).await?;
    assert_eq!(response.content, "from b");

    let record = recorded(&store).await?;
    assert_eq!(record.retries, 2);
    assert_eq!(record.fallbacks_used, vec!["a"]);
    Ok(())
}

#[tokio::test]
async fn test_all_candidates_exhausted() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "a", ResponseTemplate::new(503), 3).await;
    mount(&server, "b", ResponseTemplate::new(429).set_body_string("slow down"), 3).await;
    let (client, store) = client(registry(&server, &["a", "b"]), fast_policy())?;

    let err = client
        .complete(&ctx(), request())
        .await
        .expect_err("every candidate fails");
    let RelayErrorKind::Exhaustion(exhausted) = err.kind() else {
        panic!("expected exhaustion, got {err}");
    };
    assert_eq!(exhausted.capability(), "coding");
    assert_eq!(exhausted.last().cause().kind().status(), Some(429));

    let record = recorded(&store).await?;
    assert_eq!(
        record.error,
        "all endpoints failed: LLM API error (status 429): slow down"
    );
    assert_eq!(record.retries, 4);
    assert_eq!(record.fallbacks_used, vec!["a", "b"]);
    Ok(())
}

#[tokio::test]
async fn test_candidate_without_endpoint_is_skipped() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "b", ResponseTemplate::new(200).set_body_json(ok_body("ok")), 1).await;
    let (client, store) = client(registry(&server, &["ghost", "b"]), fast_policy())?;

    let response = client.complete(&ctx(), request()).await?;
    assert_eq!(response.content, "ok");
    assert!(recorded(&store).await?.fallbacks_used.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_no_endpoints_at_all_is_a_validation_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let (client, _store) = client(registry(&server, &["ghost", "phantom"]), fast_policy())?;

    let err = client
        .complete(&ctx(), request())
        .await
        .expect_err("nothing to call");
    let RelayErrorKind::Validation(e) = err.kind() else {
        panic!("expected validation error, got {err}");
    };
    assert_eq!(
        e.kind(),
        &ValidationErrorKind::NoCandidates("coding".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_provider_is_fatal() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "b", ResponseTemplate::new(200).set_body_json(ok_body("unused")), 0).await;
    let registry = registry(&server, &["bedrock", "b"]);
    registry.set_endpoint("bedrock", Endpoint::new("bedrock", "titan"));
    let (client, _store) = client(registry, fast_policy())?;

    let err = client
        .complete(&ctx(), request())
        .await
        .expect_err("no adapter");
    assert!(matches!(
        provider_kind(&err),
        Some(ProviderErrorKind::UnknownProvider(name)) if name == "bedrock"
    ));
    Ok(())
}

#[tokio::test]
async fn test_invalid_requests_fail_without_io() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let (client, _store) = client(registry(&server, &["a"]), fast_policy())?;

    let err = client
        .complete(&ctx(), CompletionRequest::new("coding", Vec::new()))
        .await
        .expect_err("no messages");
    assert!(matches!(
        err.kind(),
        RelayErrorKind::Validation(e) if *e.kind() == ValidationErrorKind::NoMessages
    ));

    let err = client
        .complete(&ctx(), CompletionRequest::new("", vec![Message::user("hi")]))
        .await
        .expect_err("no capability");
    assert!(matches!(
        err.kind(),
        RelayErrorKind::Validation(e) if *e.kind() == ValidationErrorKind::MissingCapability
    ));

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_cancellation_during_backoff_returns_promptly() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(&server, "a", ResponseTemplate::new(503), 1).await;
    let slow = RetryPolicy::new(3, Duration::from_secs(30), 2.0, Duration::from_secs(60));
    let (client, store) = client(registry(&server, &["a", "b"]), slow)?;

    let ctx = ctx();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = client
        .complete(&ctx, request())
        .await
        .expect_err("cancelled");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(provider_kind(&err), Some(ProviderErrorKind::Cancelled)));

    let record = recorded(&store).await?;
    assert_eq!(record.error, "call cancelled");
    Ok(())
}

#[tokio::test]
async fn test_deadline_bounds_the_call() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount(
        &server,
        "a",
        ResponseTemplate::new(200)
            .set_body_json(ok_body("late"))
            .set_delay(Duration::from_secs(10)),
        1,
    )
    .await;
    let (client, store) = client(registry(&server, &["a"]), fast_policy())?;

    let ctx = ctx().with_timeout(Duration::from_millis(200));
    let started = Instant::now();
    let err = client
        .complete(&ctx, request())
        .await
        .expect_err("deadline");
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(matches!(
        provider_kind(&err),
        Some(ProviderErrorKind::DeadlineExceeded)
    ));
    assert!(recorded(&store).await?.is_error());
    Ok(())
}
