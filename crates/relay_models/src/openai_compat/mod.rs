//! OpenAI chat-completions dialect: wire DTOs, shared translation helpers and
//! the adapters built on them.

mod convert;
mod dto;
mod ollama;
mod openai;

pub use convert::{build_chat_body, chat_completions_url, parse_chat_response, set_bearer_auth};
pub use dto::{
    ChatChoice, ChatFunction, ChatFunctionCall, ChatFunctionName, ChatMessage, ChatRequest,
    ChatRequestBuilder, ChatResponse, ChatResponseMessage, ChatTool, ChatToolCall,
    ChatToolChoice, ChatUsage,
};
pub use ollama::OllamaAdapter;
pub use openai::OpenAiAdapter;
