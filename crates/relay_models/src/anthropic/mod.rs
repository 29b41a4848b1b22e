//! Anthropic Messages API support.

mod adapter;
mod dto;

pub use adapter::AnthropicAdapter;
pub use dto::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessage, AnthropicMessageBuilder,
    AnthropicRequest, AnthropicRequestBuilder, AnthropicResponse, AnthropicResponseBlock,
    AnthropicTool, AnthropicToolChoice, AnthropicUsage,
};
