//! Request and response types for completions.

use crate::{Message, ToolCall, ToolChoice, ToolDefinition};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A completion request addressed to a capability rather than a model.
///
/// `temperature` distinguishes "unset" from an explicit `0.0`; an explicit
/// zero is always transmitted to the provider.
///
/// # Examples
///
/// ```
/// use relay_core::{CompletionRequest, Message};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let request = CompletionRequest::builder()
///     .capability("fast")
///     .messages(vec![Message::user("ping")])
///     .temperature(0.0)
///     .build()?;
///
/// assert_eq!(request.capability(), "fast");
/// assert_eq!(*request.temperature(), Some(0.0));
/// assert_eq!(*request.max_tokens(), None);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct CompletionRequest {
    /// Semantic capability such as "planning" or "fast"
    capability: String,
    /// Ordered conversation
    #[builder(default)]
    messages: Vec<Message>,
    /// Sampling temperature; `None` uses the provider default
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    /// Response length limit; `None` uses the provider default
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Tools offered to the model
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolDefinition>,
    /// Tool selection policy
    #[builder(default, setter(strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

impl CompletionRequest {
    /// Creates a new builder for `CompletionRequest`.
    pub fn builder() -> CompletionRequestBuilder {
        CompletionRequestBuilder::default()
    }

    /// Request with only a capability and messages.
    pub fn new(capability: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            capability: capability.into(),
            messages,
            temperature: None,
            max_tokens: None,
            tools: Vec::new(),
            tool_choice: None,
        }
    }
}

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub prompt_tokens: u64,
    /// Tokens generated
    pub completion_tokens: u64,
    /// Prompt plus completion
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Usage with the total derived from its parts.
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Provider response normalized to one shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Identifier of the logical call; matches the persisted record
    #[serde(default)]
    pub request_id: String,
    /// Generated text
    pub content: String,
    /// Model that actually answered
    pub model: String,
    /// Token accounting
    pub usage: TokenUsage,
    /// Why generation stopped, as reported by the provider
    pub finish_reason: String,
    /// Tool calls requested by the model
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}
