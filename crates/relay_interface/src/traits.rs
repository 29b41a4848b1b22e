//! Trait definitions for provider adapters and external collaborators.

use crate::WireRequest;
use async_trait::async_trait;
use relay_core::{CompletionResponse, Endpoint, LoopSnapshot};
use relay_error::{ProviderError, RelayResult};
use reqwest::header::HeaderMap;

/// Translates canonical requests and responses to one backend's wire schema.
///
/// Adapters hold no per-call state and are shared across concurrent calls.
/// The engine owns the HTTP exchange; an adapter only shapes URLs, headers
/// and bodies.
pub trait ProviderAdapter: Send + Sync {
    /// Registry name (e.g., "anthropic", "ollama").
    fn name(&self) -> &str;

    /// Full request URL for a base URL.
    ///
    /// Supplies the provider default when `base_url` is empty and normalizes
    /// trailing slashes and path suffixes so that repeated application is a
    /// no-op.
    fn build_url(&self, base_url: &str) -> String;

    /// Insert provider credentials into the outgoing headers.
    fn set_auth(&self, headers: &mut HeaderMap) -> Result<(), ProviderError>;

    /// Encode the request body.
    fn build_body(&self, request: &WireRequest<'_>) -> Result<Vec<u8>, ProviderError>;

    /// Decode a successful response body into the canonical shape.
    ///
    /// `requested_model` fills in the model name when the provider omits it.
    fn parse_response(
        &self,
        body: &[u8],
        requested_model: &str,
    ) -> Result<CompletionResponse, ProviderError>;
}

/// Resolves capabilities to ordered candidate endpoints.
pub trait CapabilityRegistry: Send + Sync {
    /// Candidate names for a capability, most preferred first.
    fn resolve(&self, capability: &str) -> Vec<String>;

    /// Endpoint configuration for a candidate, if one is configured.
    fn endpoint_for(&self, candidate: &str) -> Option<Endpoint>;
}

/// Read access to agent loop lifecycle snapshots.
#[async_trait]
pub trait LoopStateStore: Send + Sync {
    /// Snapshot for a loop, or `None` if the loop is unknown.
    async fn get(&self, loop_id: &str) -> RelayResult<Option<LoopSnapshot>>;
}
