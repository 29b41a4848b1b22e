//! Metrics for provider calls.
//!
//! OpenTelemetry instruments for request volume, classified failures,
//! latency and token usage. Labels carry provider and model names; errors
//! additionally carry their Transient/Fatal class and a coarse error type,
//! tokens carry whether they were prompt or completion tokens.

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};
use relay_core::TokenUsage;
use relay_error::{ClassifiedError, ProviderErrorKind, RetryableError};
use std::sync::OnceLock;

/// Meter name every instrument is registered under.
pub const METER_NAME: &str = "relay";

static METRICS: OnceLock<LlmMetrics> = OnceLock::new();

/// Process-wide provider call instruments.
///
/// Obtained through [`LlmMetrics::get`]; recording goes through the
/// `record_*` methods so labels stay consistent.
#[derive(Clone)]
pub struct LlmMetrics {
    attempts: Counter<u64>,
    failures: Counter<u64>,
    latency: Histogram<f64>,
    tokens: Counter<u64>,
}

fn call_labels(provider: &str, model: &str) -> Vec<KeyValue> {
    vec![
        KeyValue::new("provider", provider.to_string()),
        KeyValue::new("model", model.to_string()),
    ]
}

impl LlmMetrics {
    fn register() -> Self {
        let meter = global::meter(METER_NAME);
        let counter = |name: &'static str, description: &'static str| {
            meter.u64_counter(name).with_description(description).build()
        };

        Self {
            attempts: counter("relay.llm.attempts", "Provider attempts that got a response"),
            failures: counter("relay.llm.failures", "Provider attempts that failed"),
            latency: meter
                .f64_histogram("relay.llm.latency")
                .with_unit("s")
                .with_description("Provider round-trip time")
                .build(),
            tokens: counter("relay.llm.tokens", "Tokens reported by providers"),
        }
    }

    /// Instruments on the global meter provider, registered on first use.
    pub fn get() -> &'static Self {
        METRICS.get_or_init(Self::register)
    }

    /// Record one attempt that produced a response.
    pub fn record_request(&self, provider: &str, model: &str, duration_secs: f64) {
        let labels = call_labels(provider, model);
        self.attempts.add(1, &labels);
        self.latency.record(duration_secs, &labels);
    }

    /// Record a failed attempt.
    pub fn record_error(&self, provider: &str, model: &str, error: &ClassifiedError) {
        let mut labels = call_labels(provider, model);
        labels.push(KeyValue::new("class", error.class().to_string()));
        labels.push(KeyValue::new("error_type", classify_error(error.cause().kind())));
        self.failures.add(1, &labels);
    }

    /// Record token usage from a response, split by token kind.
    pub fn record_tokens(&self, provider: &str, model: &str, usage: &TokenUsage) {
        for (kind, count) in [
            ("prompt", usage.prompt_tokens),
            ("completion", usage.completion_tokens),
        ] {
            if count == 0 {
                continue;
            }
            let mut labels = call_labels(provider, model);
            labels.push(KeyValue::new("kind", kind));
            self.tokens.add(count, &labels);
        }
    }
}

/// Coarse error type for metrics labelling.
///
/// Returns one of: "rate_limit", "auth", "server", "client", "network",
/// "invalid_response", "cancelled", "timeout", "invalid_request".
pub fn classify_error(kind: &ProviderErrorKind) -> &'static str {
    match kind {
        ProviderErrorKind::Http { status: 429, .. } => "rate_limit",
        ProviderErrorKind::Http {
            status: 401 | 403, ..
        } => "auth",
        ProviderErrorKind::Http {
            status: 500..=599, ..
        } => "server",
        ProviderErrorKind::Http { .. } => "client",
        ProviderErrorKind::Connection(_) | ProviderErrorKind::BodyRead(_) => "network",
        ProviderErrorKind::ResponseParse(_) | ProviderErrorKind::NoChoices => "invalid_response",
        ProviderErrorKind::Cancelled => "cancelled",
        ProviderErrorKind::DeadlineExceeded => "timeout",
        ProviderErrorKind::RequestBuild(_) | ProviderErrorKind::UnknownProvider(_) => {
            "invalid_request"
        }
    }
}
