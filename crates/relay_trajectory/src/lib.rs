//! Trajectory reconstruction over relay call records.
//!
//! A trajectory merges the model calls and tool executions of one agent loop
//! or one trace into a single chronological view with aggregate token and
//! duration metrics. The [`api`] module serves trajectories, individual call
//! records and context utilization statistics over HTTP.
//!
//! # Example
//!
//! ```
//! use relay_storage::{CallStore, ToolCallStore};
//! use relay_trajectory::{KvLoopStateStore, Reconstructor, api};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let ttl = Duration::from_secs(3600);
//! let reconstructor = Reconstructor::new(
//!     Arc::new(CallStore::in_memory(ttl)),
//!     Arc::new(ToolCallStore::in_memory(ttl)),
//!     Arc::new(KvLoopStateStore::in_memory(ttl)),
//! );
//! let router = api::create_router_with_prefix(
//!     "/trajectory-api",
//!     api::ApiState::new(Arc::new(reconstructor)),
//! );
//! # let _ = router;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
mod loops;
mod reconstruct;
mod stats;
mod trajectory;

pub use loops::{KvLoopStateStore, LOOPS_BUCKET};
pub use reconstruct::Reconstructor;
pub use stats::{CallContextDetail, CapabilityContextStats, ContextStats, ContextSummary};
pub use trajectory::{Format, ModelCallEntry, ToolCallEntry, Trajectory, TrajectoryEntry};
