//! Capability-routed LLM invocation.
//!
//! [`RelayClient`] resolves a semantic capability ("planning", "fast", ...)
//! to an ordered chain of candidate models, calls each through its provider
//! adapter with retry and jittered backoff, falls back on transient
//! exhaustion, and records every terminal outcome for later trajectory
//! reconstruction. A [`HealthTracker`] skips candidates that keep failing.
//!
//! # Example
//!
//! ```no_run
//! use relay_client::{CallContext, RelayClient, StaticCapabilityRegistry};
//! use relay_core::{CompletionRequest, Message, TraceContext};
//! use std::sync::Arc;
//!
//! # async fn example() -> relay_error::RelayResult<()> {
//! let client = RelayClient::builder(Arc::new(StaticCapabilityRegistry::builtin())).build()?;
//! let ctx = CallContext::new().with_trace(TraceContext::new("trace-42"));
//!
//! let response = client
//!     .complete(&ctx, CompletionRequest::new("fast", vec![Message::user("Hello")]))
//!     .await?;
//! println!("{} answered: {}", response.model, response.content);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod context;
mod health;
mod registry;

pub use client::{RelayClient, RelayClientBuilder};
pub use context::CallContext;
pub use health::{CircuitState, EndpointHealth, HealthTracker};
pub use registry::StaticCapabilityRegistry;
