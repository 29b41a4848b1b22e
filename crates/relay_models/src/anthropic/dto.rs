//! Anthropic Messages API data transfer objects.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Anthropic Messages API request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct AnthropicRequest {
    /// Model identifier
    model: String,
    /// Maximum tokens to generate (required by the API)
    max_tokens: u32,
    /// Conversation turns, without system messages
    messages: Vec<AnthropicMessage>,
    /// System prompt
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Sampling temperature; an explicit zero is kept
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    /// Tools offered to the model
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tools: Vec<AnthropicTool>,
    /// Tool selection policy
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_choice: Option<AnthropicToolChoice>,
}

impl AnthropicRequest {
    /// Creates a new builder for `AnthropicRequest`.
    pub fn builder() -> AnthropicRequestBuilder {
        AnthropicRequestBuilder::default()
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct AnthropicMessage {
    /// "user" or "assistant"
    role: String,
    /// Plain text or content blocks
    content: AnthropicContent,
}

impl AnthropicMessage {
    /// Creates a new builder for `AnthropicMessage`.
    pub fn builder() -> AnthropicMessageBuilder {
        AnthropicMessageBuilder::default()
    }
}

/// Message content: a bare string or a list of typed blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    /// Plain text
    Text(String),
    /// Typed content blocks
    Blocks(Vec<AnthropicContentBlock>),
}

impl From<String> for AnthropicContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<AnthropicContentBlock>> for AnthropicContent {
    fn from(blocks: Vec<AnthropicContentBlock>) -> Self {
        Self::Blocks(blocks)
    }
}

/// Typed content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    /// Text block
    Text {
        /// Text content
        text: String,
    },
    /// Tool call issued by the assistant
    ToolUse {
        /// Call identifier
        id: String,
        /// Tool name
        name: String,
        /// Arguments; always an object, never null
        input: Value,
    },
    /// Result of a tool call, sent as user content
    ToolResult {
        /// Call this result answers
        tool_use_id: String,
        /// Result text
        content: String,
    },
}

/// Tool definition in Anthropic's shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct AnthropicTool {
    /// Tool name
    name: String,
    /// What the tool does
    description: String,
    /// JSON schema of the input
    input_schema: Value,
}

impl AnthropicTool {
    /// Create a tool definition.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Tool selection policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicToolChoice {
    /// Model decides
    Auto,
    /// Model must call some tool
    Any,
    /// Model must call the named tool
    Tool {
        /// Tool name
        name: String,
    },
}

/// Anthropic Messages API response.
#[derive(Debug, Clone, PartialEq, Deserialize, Getters)]
pub struct AnthropicResponse {
    /// Response identifier
    #[serde(default)]
    id: String,
    /// Model that produced the response
    #[serde(default)]
    model: String,
    /// Content blocks
    #[serde(default)]
    content: Vec<AnthropicResponseBlock>,
    /// Why generation stopped
    #[serde(default)]
    stop_reason: Option<String>,
    /// Token usage
    #[serde(default)]
    usage: AnthropicUsage,
}

/// Content block in a response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    /// Generated text
    Text {
        /// Text content
        text: String,
    },
    /// Tool call requested by the model
    ToolUse {
        /// Call identifier
        id: String,
        /// Tool name
        name: String,
        /// Arguments
        #[serde(default)]
        input: Value,
    },
    /// Block types this adapter does not interpret
    #[serde(other)]
    Other,
}

/// Token usage statistics from Anthropic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Getters)]
pub struct AnthropicUsage {
    /// Input tokens consumed
    #[serde(default)]
    input_tokens: u64,
    /// Output tokens generated
    #[serde(default)]
    output_tokens: u64,
}
