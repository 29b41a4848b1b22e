//! Message types for conversation history.

use crate::{Role, ToolCall};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// One immutable entry in a conversation.
///
/// # Examples
///
/// ```
/// use relay_core::{Message, Role};
///
/// let message = Message::user("Summarize the diff");
/// assert_eq!(*message.role(), Role::User);
/// assert!(message.tool_calls().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct Message {
    /// Author of the message
    role: Role,
    /// Text content
    #[serde(default)]
    content: String,
    /// Tool calls requested by an assistant message
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<ToolCall>,
    /// Call this tool message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl Message {
    /// Create a plain message with the given role.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// System instruction.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// User turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Assistant turn without tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Assistant turn that requested tool calls.
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Result of running a tool, keyed by the call it answers.
    ///
    /// # Examples
    ///
    /// ```
    /// use relay_core::{Message, Role};
    ///
    /// let message = Message::tool_result("call_1", "42 files");
    /// assert_eq!(*message.role(), Role::Tool);
    /// assert_eq!(message.tool_call_id().as_deref(), Some("call_1"));
    /// ```
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }
}
