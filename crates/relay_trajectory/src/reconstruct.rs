//! Trajectory reconstruction from stored records.

use crate::{Format, Trajectory};
use relay_core::LoopSnapshot;
use relay_error::RelayResult;
use relay_interface::LoopStateStore;
use relay_storage::{CallRecord, CallStore, ToolCallRecord, ToolCallStore};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Builds trajectories for loops and traces.
///
/// Tool records are supplementary: a failure to read them degrades to a
/// trajectory of model calls only.
#[derive(Clone)]
pub struct Reconstructor {
    calls: Arc<CallStore>,
    tools: Arc<ToolCallStore>,
    loops: Arc<dyn LoopStateStore>,
}

impl std::fmt::Debug for Reconstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconstructor")
            .field("calls", &self.calls)
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}

impl Reconstructor {
    /// Reconstructor over the given stores.
    pub fn new(
        calls: Arc<CallStore>,
        tools: Arc<ToolCallStore>,
        loops: Arc<dyn LoopStateStore>,
    ) -> Self {
        Self { calls, tools, loops }
    }

    /// Model call store.
    pub fn calls(&self) -> &Arc<CallStore> {
        &self.calls
    }

    /// Trajectory of one agent loop.
    ///
    /// `None` when the loop itself is unknown, even if records mention it.
    /// Failures reading either record store degrade to an empty list.
    #[instrument(skip(self))]
    pub async fn by_loop(&self, loop_id: &str, format: Format) -> RelayResult<Option<Trajectory>> {
        let Some(snapshot) = self.loops.get(loop_id).await? else {
            debug!("Loop not found");
            return Ok(None);
        };

        let calls = self.calls.get_by_loop(loop_id).await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to get LLM calls");
            Vec::new()
        });
        let tools = self.tools.get_by_loop(loop_id).await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to get tool calls");
            Vec::new()
        });

        Ok(Some(Trajectory::build(&snapshot, &calls, &tools, format)))
    }

    /// Trajectory of one trace.
    ///
    /// `None` when the trace has no records at all. A failure reading model
    /// calls is an error; a failure reading tool calls degrades. The owning
    /// loop is the first one mentioned by a record, model calls first, that
    /// resolves to a snapshot.
    #[instrument(skip(self))]
    pub async fn by_trace(
        &self,
        trace_id: &str,
        format: Format,
    ) -> RelayResult<Option<Trajectory>> {
        let calls = self.calls.get_by_trace(trace_id).await?;
        let tools = self.tools.get_by_trace(trace_id).await.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to get tool calls");
            Vec::new()
        });

        if calls.is_empty() && tools.is_empty() {
            debug!("Trace not found");
            return Ok(None);
        }

        let mut snapshot = self
            .discover_loop(&calls, &tools)
            .await
            .unwrap_or_default();
        if snapshot.trace_id.is_empty() {
            snapshot.trace_id = trace_id.to_string();
        }

        Ok(Some(Trajectory::build(&snapshot, &calls, &tools, format)))
    }

    async fn discover_loop(
        &self,
        calls: &[CallRecord],
        tools: &[ToolCallRecord],
    ) -> Option<LoopSnapshot> {
        let loop_ids = calls
            .iter()
            .map(|c| c.loop_id.as_str())
            .chain(tools.iter().map(|t| t.loop_id.as_str()))
            .filter(|id| !id.is_empty());

        for loop_id in loop_ids {
            match self.loops.get(loop_id).await {
                Ok(Some(snapshot)) => return Some(snapshot),
                Ok(None) => {}
                Err(e) => debug!(loop_id, error = %e, "Loop lookup failed"),
            }
        }
        None
    }
}
