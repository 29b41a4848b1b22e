//! Ollama adapter.

use super::convert::{build_chat_body, chat_completions_url, parse_chat_response, set_bearer_auth};
use relay_core::CompletionResponse;
use relay_error::ProviderError;
use relay_interface::{ProviderAdapter, WireRequest};
use reqwest::header::HeaderMap;
use tracing::instrument;

const PROVIDER: &str = "ollama";
const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Adapter for Ollama and other self-hosted OpenAI-compatible servers
/// (vLLM, OpenRouter).
///
/// Local servers usually need no credentials; a bearer token is sent when
/// `OPENAI_API_KEY` or an explicit key is set.
///
/// # Examples
///
/// ```
/// use relay_interface::ProviderAdapter;
/// use relay_models::OllamaAdapter;
///
/// let adapter = OllamaAdapter::new();
/// assert_eq!(adapter.build_url(""), "http://localhost:11434/v1/chat/completions");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OllamaAdapter {
    api_key: Option<String>,
}

impl OllamaAdapter {
    /// Adapter reading an optional key from the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter with an explicit bearer token.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }
}

impl ProviderAdapter for OllamaAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn build_url(&self, base_url: &str) -> String {
        chat_completions_url(base_url, DEFAULT_BASE_URL)
    }

    fn set_auth(&self, headers: &mut HeaderMap) -> Result<(), ProviderError> {
        let key = self
            .api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok());
        set_bearer_auth(PROVIDER, key.as_deref(), headers)
    }

    #[instrument(skip(self, request), fields(model = request.model))]
    fn build_body(&self, request: &WireRequest<'_>) -> Result<Vec<u8>, ProviderError> {
        build_chat_body(PROVIDER, request)
    }

    #[instrument(skip(self, body), fields(body_len = body.len()))]
    fn parse_response(
        &self,
        body: &[u8],
        requested_model: &str,
    ) -> Result<CompletionResponse, ProviderError> {
        parse_chat_response(PROVIDER, body, requested_model)
    }
}
