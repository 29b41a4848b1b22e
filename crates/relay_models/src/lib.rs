//! Provider adapters for relay.
//!
//! Each adapter translates the canonical completion request into one
//! backend's wire schema and back. Adapters never perform I/O themselves;
//! the invocation engine owns the HTTP exchange, retries and fallback.
//!
//! # Available Providers
//!
//! - **Anthropic** (`"anthropic"`) - Messages API
//! - **Ollama** (`"ollama"`) - OpenAI-compatible chat completions, also
//!   suitable for vLLM and OpenRouter
//! - **OpenAI** (`"openai"`) - hosted chat completions
//!
//! # Example
//!
//! ```
//! use relay_core::{CompletionRequest, Message};
//! use relay_interface::{ProviderAdapter, WireRequest};
//! use relay_models::AdapterRegistry;
//!
//! let registry = AdapterRegistry::with_defaults();
//! let adapter = registry.get("ollama").expect("built-in adapter");
//!
//! let request = CompletionRequest::new("fast", vec![Message::user("Hello")]);
//! let body = adapter.build_body(&WireRequest::new("llama3.2", &request)).unwrap();
//! assert!(!body.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod anthropic;
mod metrics;
mod openai_compat;
mod registry;

pub use anthropic::{
    AnthropicAdapter, AnthropicContent, AnthropicContentBlock, AnthropicMessage,
    AnthropicMessageBuilder, AnthropicRequest, AnthropicRequestBuilder, AnthropicResponse,
    AnthropicResponseBlock, AnthropicTool, AnthropicToolChoice, AnthropicUsage,
};
pub use metrics::{LlmMetrics, METER_NAME, classify_error};
pub use openai_compat::{
    ChatChoice, ChatFunction, ChatFunctionCall, ChatFunctionName, ChatMessage, ChatRequest,
    ChatRequestBuilder, ChatResponse, ChatResponseMessage, ChatTool, ChatToolCall,
    ChatToolChoice, ChatUsage, OllamaAdapter, OpenAiAdapter, build_chat_body,
    chat_completions_url, parse_chat_response, set_bearer_auth,
};
pub use registry::AdapterRegistry;
