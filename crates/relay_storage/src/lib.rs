//! TTL-bounded storage of call records for relay.
//!
//! Every top-level completion produces one [`CallRecord`]; tool executions
//! produce [`ToolCallRecord`]s. Both are kept as JSON in a [`KeyValueBucket`]
//! under `"<trace_id>.<id>"` keys so that a whole trace can be fetched with a
//! prefix scan.
//!
//! # Features
//!
//! - **Pluggable backends**: in-memory and filesystem buckets behind one trait
//! - **Store-wide TTL**: entries expire after a fixed lifetime (default 7 days)
//! - **Scan tolerance**: entries that vanish mid-scan are skipped, never fatal
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use relay_storage::{CallRecord, CallStore, DEFAULT_RECORD_TTL};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = std::env::temp_dir().join("relay-doc-example");
//! let store = CallStore::on_disk(&dir, DEFAULT_RECORD_TTL)?;
//!
//! let record = CallRecord {
//!     request_id: "req-1".into(),
//!     trace_id: "trace-doc".into(),
//!     started_at: Utc::now(),
//!     ..Default::default()
//! };
//! store.store(&record).await?;
//!
//! let trace = store.get_by_trace("trace-doc").await?;
//! assert_eq!(trace.len(), 1);
//! store.delete("trace-doc.req-1").await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod bucket;
mod filesystem;
mod global;
mod memory;
mod records;
mod store;

pub use bucket::KeyValueBucket;
pub use filesystem::FileSystemBucket;
pub use global::{
    current_call_store, current_tool_call_store, global_call_store, global_tool_call_store,
};
pub use memory::MemoryBucket;
pub use records::{
    CallRecord, StoredRecord, TOOL_PARAMS_PREVIEW_CHARS, TOOL_RESULT_PREVIEW_CHARS,
    TOOL_STATUS_ERROR, TOOL_STATUS_SUCCESS, ToolCallRecord,
};
pub use store::{CallStore, DEFAULT_RECORD_TTL, RecordStore, ToolCallStore};
