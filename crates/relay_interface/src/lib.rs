//! Trait definitions for the relay workspace.
//!
//! These traits mark the seams of the invocation engine: provider adapters
//! that speak one backend's wire protocol, the capability registry that ranks
//! candidate endpoints, and the loop-state store consulted when rebuilding
//! trajectories.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{CapabilityRegistry, LoopStateStore, ProviderAdapter};
pub use types::WireRequest;
