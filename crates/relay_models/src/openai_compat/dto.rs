//! OpenAI chat-completions data transfer objects.
//!
//! Shared by every backend that speaks the OpenAI chat-completions dialect
//! (OpenAI itself, Ollama, vLLM, OpenRouter).

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Chat-completions request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ChatRequest {
    /// Model identifier
    model: String,
    /// Conversation, system messages included
    messages: Vec<ChatMessage>,
    /// Sampling temperature; zero is sent as-is
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    /// Response length limit
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Tools offered to the model
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
    /// Tool selection policy
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ChatToolChoice>,
}

impl ChatRequest {
    /// Creates a new builder for `ChatRequest`.
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }
}

/// One message in OpenAI format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ChatMessage {
    /// "system", "user", "assistant" or "tool"
    role: String,
    /// Message text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    content: String,
    /// Tool calls issued by an assistant turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ChatToolCall>,
    /// Call answered by a tool turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    /// Create a message.
    pub fn new(
        role: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Vec<ChatToolCall>,
        tool_call_id: Option<String>,
    ) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            tool_calls,
            tool_call_id,
        }
    }
}

/// Tool call in OpenAI format. Arguments travel as a JSON string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatToolCall {
    /// Call identifier
    #[serde(default)]
    pub id: String,
    /// Always "function"
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    /// Function name and encoded arguments
    pub function: ChatFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

/// Function half of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunctionCall {
    /// Function name
    pub name: String,
    /// JSON-encoded arguments
    #[serde(default)]
    pub arguments: String,
}

/// Tool definition in OpenAI function-calling format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTool {
    /// Always "function"
    #[serde(rename = "type")]
    pub kind: String,
    /// Function details
    pub function: ChatFunction,
}

/// Function details of a tool definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatFunction {
    /// Function name
    pub name: String,
    /// What the function does
    pub description: String,
    /// JSON schema of the parameters
    pub parameters: Value,
}

/// Tool selection policy: a mode string or a named function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatToolChoice {
    /// "auto", "required" or "none"
    Mode(String),
    /// A specific function
    Function {
        /// Always "function"
        #[serde(rename = "type")]
        kind: String,
        /// Function to call
        function: ChatFunctionName,
    },
}

/// Named function reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatFunctionName {
    /// Function name
    pub name: String,
}

/// Chat-completions response.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct ChatResponse {
    /// Response identifier
    #[serde(default)]
    id: String,
    /// Model that produced the response
    #[serde(default)]
    model: String,
    /// Generated alternatives; only the first is used
    #[serde(default)]
    choices: Vec<ChatChoice>,
    /// Token usage
    #[serde(default)]
    usage: ChatUsage,
}

/// One generated alternative.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct ChatChoice {
    /// Generated message
    message: ChatResponseMessage,
    /// Why generation stopped
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Message inside a choice.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct ChatResponseMessage {
    /// Generated text; `null` when the turn only calls tools
    #[serde(default)]
    content: Option<String>,
    /// Requested tool calls
    #[serde(default)]
    tool_calls: Vec<ChatToolCall>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Getters)]
pub struct ChatUsage {
    /// Prompt tokens
    #[serde(default)]
    prompt_tokens: u64,
    /// Completion tokens
    #[serde(default)]
    completion_tokens: u64,
    /// Provider-reported total
    #[serde(default)]
    total_tokens: u64,
}
