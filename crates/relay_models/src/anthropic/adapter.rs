//! Anthropic Messages API adapter.

use super::dto::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse,
    AnthropicResponseBlock, AnthropicTool, AnthropicToolChoice,
};
use relay_core::{CompletionResponse, Message, Role, TokenUsage, ToolCall, ToolChoice};
use relay_error::{ProviderError, ProviderErrorKind};
use relay_interface::{ProviderAdapter, WireRequest};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::{debug, instrument};

const PROVIDER: &str = "anthropic";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Adapter for Anthropic's Messages API.
///
/// The API key comes from `ANTHROPIC_API_KEY` unless one is supplied with
/// [`AnthropicAdapter::with_api_key`].
///
/// # Examples
///
/// ```
/// use relay_interface::ProviderAdapter;
/// use relay_models::AnthropicAdapter;
///
/// let adapter = AnthropicAdapter::new();
/// assert_eq!(adapter.build_url(""), "https://api.anthropic.com/v1/messages");
/// assert_eq!(adapter.build_url("http://proxy/"), "http://proxy/v1/messages");
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnthropicAdapter {
    api_key: Option<String>,
}

impl AnthropicAdapter {
    /// Adapter reading its key from the environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter with an explicit API key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }

    fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }
}

fn build_error(message: impl std::fmt::Display) -> ProviderError {
    ProviderError::new(PROVIDER, ProviderErrorKind::RequestBuild(message.to_string()))
}

/// Map one canonical message to Anthropic's shape. System messages are
/// handled by the caller.
fn convert_message(message: &Message) -> Result<AnthropicMessage, ProviderError> {
    let (role, content): (&str, AnthropicContent) = match message.role() {
        Role::Assistant if !message.tool_calls().is_empty() => {
            let mut blocks = Vec::with_capacity(message.tool_calls().len() + 1);
            if !message.content().is_empty() {
                blocks.push(AnthropicContentBlock::Text {
                    text: message.content().clone(),
                });
            }
            blocks.extend(message.tool_calls().iter().map(|call| {
                AnthropicContentBlock::ToolUse {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: Value::Object(call.arguments.clone()),
                }
            }));
            ("assistant", blocks.into())
        }
        Role::Tool => match message.tool_call_id() {
            Some(tool_use_id) => (
                "user",
                vec![AnthropicContentBlock::ToolResult {
                    tool_use_id: tool_use_id.clone(),
                    content: message.content().clone(),
                }]
                .into(),
            ),
            None => ("user", message.content().clone().into()),
        },
        Role::Assistant => ("assistant", message.content().clone().into()),
        Role::User | Role::System => ("user", message.content().clone().into()),
    };
    AnthropicMessage::builder()
        .role(role)
        .content(content)
        .build()
        .map_err(build_error)
}

fn convert_tool_choice(choice: &ToolChoice) -> Option<AnthropicToolChoice> {
    match choice {
        ToolChoice::Auto => Some(AnthropicToolChoice::Auto),
        ToolChoice::Required => Some(AnthropicToolChoice::Any),
        ToolChoice::None => None,
        ToolChoice::Tool(name) => Some(AnthropicToolChoice::Tool { name: name.clone() }),
    }
}

impl ProviderAdapter for AnthropicAdapter {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn build_url(&self, base_url: &str) -> String {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        let base = base.trim_end_matches('/');
        let base = base.strip_suffix(MESSAGES_PATH).unwrap_or(base);
        format!("{}{}", base, MESSAGES_PATH)
    }

    fn set_auth(&self, headers: &mut HeaderMap) -> Result<(), ProviderError> {
        if let Some(key) = self.api_key() {
            let mut value = HeaderValue::from_str(&key).map_err(build_error)?;
            value.set_sensitive(true);
            headers.insert("x-api-key", value);
        }
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        Ok(())
    }

    #[instrument(
        skip(self, request),
        fields(model = request.model, messages = request.messages.len())
    )]
    fn build_body(&self, request: &WireRequest<'_>) -> Result<Vec<u8>, ProviderError> {
        let system_parts: Vec<&str> = request
            .messages
            .iter()
            .filter(|message| *message.role() == Role::System)
            .map(|message| message.content().as_str())
            .collect();
        let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));

        let messages = request
            .messages
            .iter()
            .filter(|message| *message.role() != Role::System)
            .map(convert_message)
            .collect::<Result<Vec<_>, _>>()?;

        let choice = request.tool_choice;
        let tools_disabled = matches!(choice, Some(ToolChoice::None));
        let tools: Vec<AnthropicTool> = if tools_disabled {
            Vec::new()
        } else {
            request
                .tools
                .iter()
                .map(|tool| {
                    AnthropicTool::new(&tool.name, &tool.description, tool.parameters.clone())
                })
                .collect()
        };
        let tool_choice = if tools.is_empty() {
            None
        } else {
            choice.and_then(convert_tool_choice)
        };

        let max_tokens = request
            .max_tokens
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_MAX_TOKENS);

        let body = AnthropicRequest::builder()
            .model(request.model)
            .max_tokens(max_tokens)
            .messages(messages)
            .system(system)
            .temperature(request.temperature)
            .tools(tools)
            .tool_choice(tool_choice)
            .build()
            .map_err(build_error)?;

        debug!(has_system = body.system().is_some(), "Built Anthropic request body");
        serde_json::to_vec(&body).map_err(build_error)
    }

    #[instrument(skip(self, body), fields(body_len = body.len()))]
    fn parse_response(
        &self,
        body: &[u8],
        requested_model: &str,
    ) -> Result<CompletionResponse, ProviderError> {
        let response: AnthropicResponse = serde_json::from_slice(body).map_err(|e| {
            ProviderError::new(
                PROVIDER,
                ProviderErrorKind::ResponseParse(format!("parse anthropic response: {}", e)),
            )
        })?;

        if response.content().is_empty() && response.stop_reason().is_none() {
            return Err(ProviderError::new(PROVIDER, ProviderErrorKind::NoChoices));
        }

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for block in response.content() {
            match block {
                AnthropicResponseBlock::Text { text } => content.push_str(text),
                AnthropicResponseBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ToolCall::new(id.clone(), name.clone(), input.clone()));
                }
                AnthropicResponseBlock::Other => {}
            }
        }

        let model = if response.model().is_empty() {
            requested_model.to_string()
        } else {
            response.model().clone()
        };

        debug!(
            response_id = %response.id(),
            tool_calls = tool_calls.len(),
            "Parsed Anthropic response"
        );
        Ok(CompletionResponse {
            request_id: String::new(),
            content,
            model,
            usage: TokenUsage::new(
                *response.usage().input_tokens(),
                *response.usage().output_tokens(),
            ),
            finish_reason: response.stop_reason().clone().unwrap_or_default(),
            tool_calls,
        })
    }
}
