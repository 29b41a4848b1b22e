//! Tests for provider call metrics.

use relay_core::TokenUsage;
use relay_error::{ClassifiedError, ProviderError, ProviderErrorKind};
use relay_models::{LlmMetrics, classify_error};

#[test]
fn test_error_types_for_labels() {
    assert_eq!(classify_error(&ProviderErrorKind::http(429, "")), "rate_limit");
    assert_eq!(classify_error(&ProviderErrorKind::http(403, "")), "auth");
    assert_eq!(classify_error(&ProviderErrorKind::http(503, "")), "server");
    assert_eq!(classify_error(&ProviderErrorKind::http(404, "")), "client");
    assert_eq!(
        classify_error(&ProviderErrorKind::Connection("refused".into())),
        "network"
    );
    assert_eq!(classify_error(&ProviderErrorKind::NoChoices), "invalid_response");
    assert_eq!(classify_error(&ProviderErrorKind::DeadlineExceeded), "timeout");
    assert_eq!(
        classify_error(&ProviderErrorKind::UnknownProvider("bedrock".into())),
        "invalid_request"
    );
}

#[test]
fn test_recording_without_meter_provider_is_a_no_op() {
    let metrics = LlmMetrics::get();
    assert!(std::ptr::eq(metrics, LlmMetrics::get()));

    metrics.record_request("ollama", "qwen", 0.25);
    metrics.record_tokens("ollama", "qwen", &TokenUsage::new(12, 0));
    let err = ClassifiedError::fatal(ProviderError::new("ollama", ProviderErrorKind::NoChoices));
    metrics.record_error("ollama", "qwen", &err);
}
