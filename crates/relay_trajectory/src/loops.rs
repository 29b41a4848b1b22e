//! Loop snapshots kept in a key-value bucket.

use async_trait::async_trait;
use relay_core::LoopSnapshot;
use relay_error::{
    RelayResult, StorageError, StorageErrorKind, ValidationError, ValidationErrorKind,
};
use relay_interface::LoopStateStore;
use relay_storage::{FileSystemBucket, KeyValueBucket, MemoryBucket};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// Bucket holding loop snapshots.
pub const LOOPS_BUCKET: &str = "AGENT_LOOPS";

/// [`LoopStateStore`] reading JSON snapshots keyed by loop id.
#[derive(Clone)]
pub struct KvLoopStateStore {
    bucket: Arc<dyn KeyValueBucket>,
}

impl std::fmt::Debug for KvLoopStateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvLoopStateStore")
            .field("bucket", &self.bucket.name())
            .finish()
    }
}

impl KvLoopStateStore {
    /// Store over an existing bucket.
    pub fn new(bucket: Arc<dyn KeyValueBucket>) -> Self {
        Self { bucket }
    }

    /// Store backed by memory.
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryBucket::new(LOOPS_BUCKET, ttl)))
    }

    /// Store backed by files under `base_path`.
    pub fn on_disk(base_path: impl Into<PathBuf>, ttl: Duration) -> RelayResult<Self> {
        let bucket = FileSystemBucket::new(base_path, LOOPS_BUCKET, ttl)?;
        Ok(Self::new(Arc::new(bucket)))
    }

    /// Write a snapshot under its id, replacing any previous one.
    #[instrument(skip(self, snapshot), fields(loop_id = %snapshot.id))]
    pub async fn put(&self, snapshot: &LoopSnapshot) -> RelayResult<()> {
        if snapshot.id.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::MissingId("id")).into());
        }
        let data = serde_json::to_vec(snapshot)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;
        self.bucket.put(&snapshot.id, data).await
    }
}

#[async_trait]
impl LoopStateStore for KvLoopStateStore {
    #[instrument(skip(self))]
    async fn get(&self, loop_id: &str) -> RelayResult<Option<LoopSnapshot>> {
        let Some(data) = self.bucket.get(loop_id).await? else {
            return Ok(None);
        };
        let snapshot = serde_json::from_slice(&data).map_err(|e| {
            StorageError::new(StorageErrorKind::Deserialization(format!(
                "loop {}: {}",
                loop_id, e
            )))
        })?;
        Ok(Some(snapshot))
    }
}
