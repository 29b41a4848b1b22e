//! The invocation engine.

use crate::{CallContext, HealthTracker, StaticCapabilityRegistry};
use chrono::Utc;
use relay_core::{CompletionRequest, CompletionResponse, Endpoint};
use relay_error::{
    ClassifiedError, ConfigError, ExhaustionError, ProviderError, ProviderErrorKind, RelayResult,
    ValidationError, ValidationErrorKind,
};
use relay_interface::{CapabilityRegistry, ProviderAdapter, WireRequest};
use relay_models::{AdapterRegistry, LlmMetrics};
use relay_retry::{
    HealthSettings, RelayConfig, RetryPolicy, backoff_delay, classify, transport_error_kind,
};
use relay_storage::{CallRecord, CallStore};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, info, instrument, warn};
use uuid::Uuid;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);
const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Routes capability-addressed requests to concrete models.
///
/// Each call walks the capability's candidate chain in order. Transient
/// failures are retried with jittered exponential backoff; once a candidate's
/// attempts are spent the next candidate is tried. A fatal failure stops the
/// whole chain. Candidates whose circuit is open in the [`HealthTracker`]
/// are skipped unless every candidate is open. Every terminal outcome is
/// written to the call store, when one is configured, without delaying the
/// caller.
///
/// Cloning is cheap; clones share the registries, HTTP pool and store.
#[derive(Clone)]
pub struct RelayClient {
    capabilities: Arc<dyn CapabilityRegistry>,
    adapters: Arc<AdapterRegistry>,
    health: Arc<HealthTracker>,
    http: reqwest::Client,
    policy: RetryPolicy,
    call_store: Option<Arc<CallStore>>,
    max_response_bytes: usize,
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("adapters", &self.adapters.names())
            .field("policy", &self.policy)
            .field("health", self.health.settings())
            .field("call_store", &self.call_store.is_some())
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

/// Candidate bookkeeping across one call.
#[derive(Debug, Default)]
struct ChainState {
    retries: u32,
    fallbacks_used: Vec<String>,
}

impl RelayClient {
    /// Start building a client over a capability registry.
    pub fn builder(capabilities: Arc<dyn CapabilityRegistry>) -> RelayClientBuilder {
        RelayClientBuilder::new(capabilities)
    }

    /// Client configured entirely from a [`RelayConfig`].
    ///
    /// Uses the `[registry]` table when present and the built-in registry
    /// otherwise. Calls are recorded on disk when `[store] path` is set and
    /// in memory otherwise.
    pub fn from_config(config: &RelayConfig) -> RelayResult<Self> {
        let capabilities: Arc<dyn CapabilityRegistry> = match &config.registry {
            Some(registry) => Arc::new(StaticCapabilityRegistry::new(registry.clone())),
            None => Arc::new(StaticCapabilityRegistry::builtin()),
        };
        let store = match &config.store.path {
            Some(path) => CallStore::on_disk(path, config.store.ttl())?,
            None => CallStore::in_memory(config.store.ttl()),
        };
        Self::builder(capabilities)
            .config(config)
            .call_store(Arc::new(store))
            .build()
    }

    /// Retry policy in effect.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Candidate health shared by every clone of this client.
    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    /// Store receiving call records, if any.
    pub fn call_store(&self) -> Option<&Arc<CallStore>> {
        self.call_store.as_ref()
    }

    /// Execute a completion for the request's capability.
    ///
    /// Returns a validation error without any I/O when the request has no
    /// capability, no messages, or resolves to no candidates. Returns the
    /// classified cause when a candidate fails fatally, and an
    /// [`ExhaustionError`] when every candidate's attempts are spent.
    #[instrument(
        skip(self, ctx, request),
        fields(
            capability = %request.capability(),
            trace_id = ctx.trace().trace_id.as_deref().unwrap_or(""),
            request_id
        )
    )]
    pub async fn complete(
        &self,
        ctx: &CallContext,
        request: CompletionRequest,
    ) -> RelayResult<CompletionResponse> {
        validate(&request)?;

        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());
        let clock = Instant::now();
        let mut record = CallRecord {
            request_id: request_id.clone(),
            trace_id: ctx.trace().trace_id.clone().unwrap_or_default(),
            loop_id: ctx.trace().loop_id.clone().unwrap_or_default(),
            capability: request.capability().clone(),
            messages: request.messages().clone(),
            started_at: Utc::now(),
            ..CallRecord::default()
        };

        let candidates = self.capabilities.resolve(request.capability());
        if candidates.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::NoCandidates(
                request.capability().clone(),
            ))
            .into());
        }
        let candidates = self.health.available_chain(&candidates);
        debug!(candidates = ?candidates, "Resolved capability");

        let mut chain = ChainState::default();
        let mut last: Option<ClassifiedError> = None;

        for candidate in &candidates {
            let Some(endpoint) = self.capabilities.endpoint_for(candidate) else {
                warn!(candidate = %candidate, "No endpoint configured for candidate, skipping");
                continue;
            };

            let (outcome, attempts) = self
                .try_endpoint(ctx, candidate, &endpoint, &request)
                .await;
            chain.retries += attempts.saturating_sub(1);

            match outcome {
                Ok(mut response) => {
                    response.request_id = request_id;
                    info!(
                        model = %response.model,
                        provider = %endpoint.provider,
                        retries = chain.retries,
                        fallbacks = chain.fallbacks_used.len(),
                        "LLM call succeeded"
                    );

                    record.model = response.model.clone();
                    record.provider = endpoint.provider.clone();
                    record.set_response(response.content.clone());
                    record.prompt_tokens = response.usage.prompt_tokens;
                    record.completion_tokens = response.usage.completion_tokens;
                    record.total_tokens = response.usage.total_tokens;
                    record.finish_reason = response.finish_reason.clone();
                    record.context_budget = endpoint.max_tokens_budget;
                    self.persist(finish(record, chain, clock));
                    return Ok(response);
                }
                Err(err) => {
                    chain.fallbacks_used.push(candidate.clone());
                    if err.is_fatal() {
                        warn!(
                            candidate = %candidate,
                            error = %err.cause().kind(),
                            "Fatal error, aborting fallback chain"
                        );
                        record.model = candidate.clone();
                        record.provider = endpoint.provider.clone();
                        record.context_budget = endpoint.max_tokens_budget;
                        record.error = err.cause().kind().to_string();
                        self.persist(finish(record, chain, clock));
                        return Err(err.into());
                    }
                    warn!(
                        candidate = %candidate,
                        error = %err.cause().kind(),
                        "Candidate exhausted, trying next"
                    );
                    last = Some(err);
                }
            }
        }

        let Some(last) = last else {
            // Every candidate lacked an endpoint.
            warn!("No candidate had a configured endpoint");
            record.error = format!(
                "no endpoint configured for capability {}",
                request.capability()
            );
            self.persist(finish(record, chain, clock));
            return Err(ValidationError::new(ValidationErrorKind::NoCandidates(
                request.capability().clone(),
            ))
            .into());
        };

        warn!(error = %last.cause().kind(), "All endpoints failed");
        record.error = format!("all endpoints failed: {}", last.cause().kind());
        self.persist(finish(record, chain, clock));
        Err(ExhaustionError::new(request.capability().clone(), last).into())
    }

    /// Attempt one endpoint under the retry policy.
    ///
    /// Returns the outcome together with the number of attempts made.
    /// Success and transient exhaustion update the candidate's health.
    async fn try_endpoint(
        &self,
        ctx: &CallContext,
        candidate: &str,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> (Result<CompletionResponse, ClassifiedError>, u32) {
        let Some(adapter) = self.adapters.get(&endpoint.provider) else {
            let err = classify(ProviderError::new(
                &endpoint.provider,
                ProviderErrorKind::UnknownProvider(endpoint.provider.clone()),
            ));
            return (Err(err), 1);
        };

        let metrics = LlmMetrics::get();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match self.attempt(ctx, adapter.as_ref(), endpoint, request).await {
                Ok(response) => {
                    self.health.mark_success(candidate);
                    return (Ok(response), attempt);
                }
                Err(err) => err,
            };
            metrics.record_error(adapter.name(), &endpoint.model, &err);

            if err.is_fatal() {
                return (Err(err), attempt);
            }
            if attempt >= self.policy.max_attempts {
                self.health.mark_failure(candidate);
                return (Err(err), attempt);
            }

            let delay = backoff_delay(attempt, &self.policy);
            debug!(
                provider = adapter.name(),
                model = %endpoint.model,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err.cause().kind(),
                "Transient error, backing off"
            );
            if let Err(stop) = ctx.guard(adapter.name(), tokio::time::sleep(delay)).await {
                return (Err(stop), attempt);
            }
        }
    }

    /// One HTTP exchange with a provider.
    #[instrument(skip_all, fields(provider = adapter.name(), model = %endpoint.model))]
    async fn attempt(
        &self,
        ctx: &CallContext,
        adapter: &dyn ProviderAdapter,
        endpoint: &Endpoint,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ClassifiedError> {
        let provider = adapter.name();
        let url = adapter.build_url(&endpoint.base_url);
        let body = adapter
            .build_body(&WireRequest::new(&endpoint.model, request))
            .map_err(classify)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        adapter.set_auth(&mut headers).map_err(classify)?;

        debug!(url = %url, messages = request.messages().len(), "Sending LLM request");
        let started = Instant::now();
        let exchange = async {
            let response = self
                .http
                .post(&url)
                .headers(headers)
                .body(body)
                .send()
                .await
                .map_err(|e| ProviderError::new(provider, transport_error_kind(&e)))?;
            let status = response.status();
            let bytes = read_limited(provider, response, self.max_response_bytes).await?;
            Ok::<_, ProviderError>((status, bytes))
        };
        let (status, bytes) = ctx.guard(provider, exchange).await?.map_err(classify)?;
        let elapsed = started.elapsed().as_secs_f64();
        LlmMetrics::get().record_request(provider, &endpoint.model, elapsed);

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes);
            debug!(status = status.as_u16(), "Provider returned error status");
            return Err(classify(ProviderError::new(
                provider,
                ProviderErrorKind::http(status.as_u16(), &text),
            )));
        }

        let response = adapter
            .parse_response(&bytes, &endpoint.model)
            .map_err(classify)?;
        LlmMetrics::get().record_tokens(provider, &response.model, &response.usage);
        Ok(response)
    }

    /// Write a record in the background; failures are logged only.
    fn persist(&self, record: CallRecord) {
        let Some(store) = self.call_store.clone() else {
            return;
        };
        let task = async move {
            match store.store(&record).await {
                Ok(key) => debug!(key = %key, "Recorded LLM call"),
                Err(e) => warn!(
                    request_id = %record.request_id,
                    trace_id = %record.trace_id,
                    capability = %record.capability,
                    error = %e,
                    "Failed to record LLM call"
                ),
            }
        };
        tokio::spawn(task.instrument(tracing::Span::current()));
    }
}

fn validate(request: &CompletionRequest) -> Result<(), ValidationError> {
    if request.capability().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::MissingCapability));
    }
    if request.messages().is_empty() {
        return Err(ValidationError::new(ValidationErrorKind::NoMessages));
    }
    Ok(())
}

fn finish(mut record: CallRecord, chain: ChainState, clock: Instant) -> CallRecord {
    record.completed_at = Utc::now();
    record.duration_ms = clock.elapsed().as_millis() as u64;
    record.retries = chain.retries;
    record.fallbacks_used = chain.fallbacks_used;
    record
}

/// Read at most `limit` bytes of the body; the rest is discarded.
async fn read_limited(
    provider: &str,
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ProviderError> {
    let mut body = Vec::new();
    while body.len() < limit {
        let chunk = response
            .chunk()
            .await
            .map_err(|e| ProviderError::new(provider, ProviderErrorKind::BodyRead(e.to_string())))?;
        let Some(chunk) = chunk else {
            break;
        };
        let room = limit - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }
    Ok(body)
}

/// Builder for [`RelayClient`].
///
/// # Examples
///
/// ```
/// use relay_client::{RelayClient, StaticCapabilityRegistry};
/// use relay_retry::RetryPolicy;
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn main() -> relay_error::RelayResult<()> {
/// let client = RelayClient::builder(Arc::new(StaticCapabilityRegistry::builtin()))
///     .retry_policy(RetryPolicy::new(
///         5,
///         Duration::from_millis(200),
///         2.0,
///         Duration::from_secs(10),
///     ))
///     .timeout(Duration::from_secs(60))
///     .build()?;
///
/// assert_eq!(client.policy().max_attempts, 5);
/// assert!(client.call_store().is_none());
/// # Ok(())
/// # }
/// ```
pub struct RelayClientBuilder {
    capabilities: Arc<dyn CapabilityRegistry>,
    adapters: Option<Arc<AdapterRegistry>>,
    health: Option<Arc<HealthTracker>>,
    health_settings: HealthSettings,
    http: Option<reqwest::Client>,
    policy: RetryPolicy,
    timeout: Duration,
    max_response_bytes: usize,
    call_store: Option<Arc<CallStore>>,
}

impl RelayClientBuilder {
    fn new(capabilities: Arc<dyn CapabilityRegistry>) -> Self {
        Self {
            capabilities,
            adapters: None,
            health: None,
            health_settings: HealthSettings::default(),
            http: None,
            policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            call_store: None,
        }
    }

    /// Take retry policy, circuit breaker settings, timeout and body limit
    /// from configuration.
    pub fn config(mut self, config: &RelayConfig) -> Self {
        self.policy = config.retry.clone();
        self.health_settings = config.health.clone();
        self.timeout = config.client.timeout();
        self.max_response_bytes = config.client.max_response_bytes;
        self
    }

    /// Adapter registry; defaults to [`AdapterRegistry::global`].
    pub fn adapters(mut self, adapters: Arc<AdapterRegistry>) -> Self {
        self.adapters = Some(adapters);
        self
    }

    /// Circuit breaker settings for a tracker owned by this client.
    pub fn health_settings(mut self, settings: HealthSettings) -> Self {
        self.health_settings = settings;
        self
    }

    /// Shared health tracker; overrides [`Self::health_settings`].
    pub fn health(mut self, health: Arc<HealthTracker>) -> Self {
        self.health = Some(health);
        self
    }

    /// Preconfigured HTTP client; overrides [`Self::timeout`].
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Per-request HTTP timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Maximum response body bytes read per attempt.
    pub fn max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Store receiving call records.
    pub fn call_store(mut self, store: Arc<CallStore>) -> Self {
        self.call_store = Some(store);
        self
    }

    /// Build the client.
    pub fn build(self) -> RelayResult<RelayClient> {
        self.policy.validate()?;
        let health = match self.health {
            Some(health) => health,
            None => {
                self.health_settings.validate()?;
                Arc::new(HealthTracker::new(self.health_settings))
            }
        };
        let http = match self.http {
            Some(http) => http,
            None => reqwest::Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| ConfigError::new(format!("build HTTP client: {}", e)))?,
        };
        Ok(RelayClient {
            capabilities: self.capabilities,
            adapters: self.adapters.unwrap_or_else(AdapterRegistry::global),
            health,
            http,
            policy: self.policy,
            call_store: self.call_store,
            max_response_bytes: self.max_response_bytes,
        })
    }
}
