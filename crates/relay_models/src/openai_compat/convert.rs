//! Request and response translation shared by the OpenAI-compatible adapters.

use super::dto::{
    ChatFunction, ChatFunctionCall, ChatFunctionName, ChatMessage, ChatRequest, ChatResponse,
    ChatTool, ChatToolCall, ChatToolChoice,
};
use relay_core::{CompletionResponse, Message, Role, TokenUsage, ToolCall, ToolChoice};
use relay_error::{ProviderError, ProviderErrorKind};
use relay_interface::WireRequest;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use tracing::debug;

const CHAT_COMPLETIONS_PATH: &str = "/chat/completions";

/// Chat-completions URL for `base_url`, falling back to `default_base`.
///
/// Appending is skipped when the path is already present, so applying the
/// result again yields the same URL.
pub fn chat_completions_url(base_url: &str, default_base: &str) -> String {
    let base = if base_url.is_empty() {
        default_base
    } else {
        base_url
    };
    let base = base.trim_end_matches('/');
    if base.ends_with(CHAT_COMPLETIONS_PATH) {
        base.to_string()
    } else {
        format!("{}{}", base, CHAT_COMPLETIONS_PATH)
    }
}

/// Insert `Authorization: Bearer <key>` when a non-empty key is available.
pub fn set_bearer_auth(
    provider: &str,
    api_key: Option<&str>,
    headers: &mut HeaderMap,
) -> Result<(), ProviderError> {
    let Some(key) = api_key.filter(|key| !key.is_empty()) else {
        return Ok(());
    };
    let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
        .map_err(|e| build_error(provider, e))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(())
}

fn build_error(provider: &str, message: impl std::fmt::Display) -> ProviderError {
    ProviderError::new(provider, ProviderErrorKind::RequestBuild(message.to_string()))
}

fn convert_message(message: &Message) -> ChatMessage {
    let tool_calls = if *message.role() == Role::Assistant {
        message
            .tool_calls()
            .iter()
            .map(|call| ChatToolCall {
                id: call.id.clone(),
                kind: "function".to_string(),
                function: ChatFunctionCall {
                    name: call.name.clone(),
                    arguments: Value::Object(call.arguments.clone()).to_string(),
                },
            })
            .collect()
    } else {
        Vec::new()
    };
    let tool_call_id = if *message.role() == Role::Tool {
        message.tool_call_id().clone()
    } else {
        None
    };
    ChatMessage::new(
        message.role().to_string(),
        message.content().clone(),
        tool_calls,
        tool_call_id,
    )
}

fn convert_tool_choice(choice: &ToolChoice) -> ChatToolChoice {
    match choice {
        ToolChoice::Tool(name) => ChatToolChoice::Function {
            kind: "function".to_string(),
            function: ChatFunctionName { name: name.clone() },
        },
        mode => ChatToolChoice::Mode(mode.to_string()),
    }
}

/// Encode a chat-completions request body.
pub fn build_chat_body(
    provider: &str,
    request: &WireRequest<'_>,
) -> Result<Vec<u8>, ProviderError> {
    let messages: Vec<ChatMessage> = request.messages.iter().map(convert_message).collect();

    let tools: Vec<ChatTool> = request
        .tools
        .iter()
        .map(|tool| ChatTool {
            kind: "function".to_string(),
            function: ChatFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        })
        .collect();
    let tool_choice = if tools.is_empty() {
        None
    } else {
        request.tool_choice.map(convert_tool_choice)
    };

    let body = ChatRequest::builder()
        .model(request.model)
        .messages(messages)
        .temperature(request.temperature)
        .max_tokens(request.max_tokens.filter(|limit| *limit > 0))
        .tools(tools)
        .tool_choice(tool_choice)
        .build()
        .map_err(|e| build_error(provider, e))?;

    debug!(provider, model = request.model, "Built chat-completions body");
    serde_json::to_vec(&body).map_err(|e| build_error(provider, e))
}

fn parse_arguments(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Decode a chat-completions response body. Only the first choice is used.
pub fn parse_chat_response(
    provider: &str,
    body: &[u8],
    requested_model: &str,
) -> Result<CompletionResponse, ProviderError> {
    let response: ChatResponse = serde_json::from_slice(body).map_err(|e| {
        ProviderError::new(
            provider,
            ProviderErrorKind::ResponseParse(format!("parse openai response: {}", e)),
        )
    })?;

    let Some(choice) = response.choices().first() else {
        return Err(ProviderError::new(provider, ProviderErrorKind::NoChoices));
    };

    let tool_calls = choice
        .message()
        .tool_calls()
        .iter()
        .map(|call| ToolCall {
            id: call.id.clone(),
            name: call.function.name.clone(),
            arguments: parse_arguments(&call.function.arguments),
        })
        .collect();

    let usage = response.usage();
    let mut token_usage = TokenUsage::new(*usage.prompt_tokens(), *usage.completion_tokens());
    if *usage.total_tokens() > 0 {
        token_usage.total_tokens = *usage.total_tokens();
    }

    let model = if response.model().is_empty() {
        requested_model.to_string()
    } else {
        response.model().clone()
    };

    Ok(CompletionResponse {
        request_id: String::new(),
        content: choice.message().content().clone().unwrap_or_default(),
        model,
        usage: token_usage,
        finish_reason: choice.finish_reason().clone().unwrap_or_default(),
        tool_calls,
    })
}
