//! Relay - capability-routed LLM invocation.
//!
//! Relay lets an agentic application ask for a completion by *capability*
//! ("planning", "coding", "fast") instead of a fixed model. Each capability
//! resolves to a ranked chain of candidate endpoints that are called through
//! provider adapters with retry and fallback. Every call is recorded so that
//! the trajectory of a loop or trace can be reconstructed later.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use relay::{CallContext, CompletionRequest, Message, RelayClient, RelayConfig, TraceContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     relay::init_tracing()?;
//!
//!     let client = RelayClient::from_config(&RelayConfig::load()?)?;
//!     let ctx = CallContext::new().with_trace(TraceContext::new("trace-1"));
//!
//!     let request = CompletionRequest::new("planning", vec![Message::user("Outline a parser")]);
//!     let response = client.complete(&ctx, request).await?;
//!     println!("{}: {}", response.model, response.content);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `relay_error` - Error types and Transient/Fatal classification
//! - `relay_core` - Canonical messages, requests and responses
//! - `relay_interface` - Adapter, registry and loop-state traits
//! - `relay_retry` - Classifier, backoff and configuration
//! - `relay_models` - Anthropic and OpenAI-compatible adapters
//! - `relay_storage` - Call and tool-call record stores
//! - `relay_client` - The invocation engine
//! - `relay_trajectory` - Trajectory reconstruction and HTTP queries
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod telemetry;

pub use telemetry::{TelemetryConfig, init_tracing, init_tracing_with_config};

pub use relay_client::*;
pub use relay_core::*;
pub use relay_error::*;
pub use relay_interface::*;
pub use relay_models::*;
pub use relay_retry::*;
pub use relay_storage::*;
pub use relay_trajectory::{
    CallContextDetail, CapabilityContextStats, ContextStats, ContextSummary, Format,
    KvLoopStateStore, LOOPS_BUCKET, ModelCallEntry, Reconstructor, ToolCallEntry, Trajectory,
    TrajectoryEntry, api,
};
