//! Core data types for the relay workspace.
//!
//! This crate holds the canonical, provider-neutral shapes that flow through
//! the invocation engine: conversation messages, completion requests and
//! responses, tool calling, resolved endpoints, and loop snapshots used when
//! reconstructing trajectories.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod endpoint;
mod json;
mod message;
mod preview;
mod request;
mod role;
mod tool;

pub use endpoint::{Endpoint, LoopSnapshot, TraceContext};
pub use json::{extract_json, extract_json_array};
pub use message::Message;
pub use preview::{ENTRY_PREVIEW_CHARS, RECORD_PREVIEW_CHARS, truncate_preview};
pub use request::{
    CompletionRequest, CompletionRequestBuilder, CompletionRequestBuilderError,
    CompletionResponse, TokenUsage,
};
pub use role::Role;
pub use tool::{ToolCall, ToolChoice, ToolDefinition};
