//! OpenAI adapter.

use super::convert::{build_chat_body, chat_completions_url, parse_chat_response, set_bearer_auth};
use relay_core::CompletionResponse;
use relay_error::ProviderError;
use relay_interface::{ProviderAdapter, WireRequest};
use reqwest::header::HeaderMap;
use tracing::instrument;

const PROVIDER: &str = "openai";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Adapter for the hosted OpenAI chat-completions API.
///
/// # Examples
///
/// ```
/// use relay_interface::ProviderAdapter;
/// use relay_models::OpenAiAdapter;
///
/// let adapter = OpenAiAdapter::with_api_key("sk-test");
/// assert_eq!(adapter.name(), "openai");
/// assert_eq!(adapter.build_url(""), "https://api.openai.com/v1/chat/completions");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpenAiAdapter {
    api_key: Option<String>,
}

impl OpenAiAdapter {
    /// Adapter reading its key from `OPENAI_API_KEY`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }
}

impl ProviderAdapter for OpenAiAdapter {
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
