//! Types shared between the engine and adapters.

use relay_core::{CompletionRequest, Message, ToolChoice, ToolDefinition};

/// Everything an adapter needs to encode one attempt.
///
/// Borrowed from the caller's request so retries never clone the conversation.
///
/// # Examples
///
/// ```
/// use relay_core::{CompletionRequest, Message};
/// use relay_interface::WireRequest;
///
/// let request = CompletionRequest::new("fast", vec![Message::user("hi")]);
/// let wire = WireRequest::new("llama3.2", &request);
/// assert_eq!(wire.model, "llama3.2");
/// assert_eq!(wire.messages.len(), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WireRequest<'a> {
    /// Model identifier sent on the wire
    pub model: &'a str,
    /// Ordered conversation
    pub messages: &'a [Message],
    /// Sampling temperature, if set
    pub temperature: Option<f64>,
    /// Response length limit, if set
    pub max_tokens: Option<u32>,
    /// Tools offered to the model
    pub tools: &'a [ToolDefinition],
    /// Tool selection policy
    pub tool_choice: Option<&'a ToolChoice>,
}

impl<'a> WireRequest<'a> {
    /// Wire parameters for `request` addressed to `model`.
    pub fn new(model: &'a str, request: &'a CompletionRequest) -> Self {
        Self {
            model,
            messages: request.messages(),
            temperature: *request.temperature(),
            max_tokens: *request.max_tokens(),
            tools: request.tools(),
            tool_choice: request.tool_choice().as_ref(),
        }
    }
}
