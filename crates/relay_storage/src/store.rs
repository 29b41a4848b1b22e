//! Typed record stores over a key-value bucket.

use crate::{
    CallRecord, FileSystemBucket, KeyValueBucket, MemoryBucket, StoredRecord, ToolCallRecord,
};
use relay_error::{
    RelayResult, StorageError, StorageErrorKind, ValidationError, ValidationErrorKind,
};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Default record lifetime: seven days.
pub const DEFAULT_RECORD_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Store of model-call records (bucket `LLM_CALLS`).
pub type CallStore = RecordStore<CallRecord>;

/// Store of tool-call records (bucket `TOOL_CALLS`).
pub type ToolCallStore = RecordStore<ToolCallRecord>;

/// JSON-encoded records of one type, keyed `"<trace_id>.<id>"`.
///
/// The composite key makes trace lookups a prefix scan. Loop lookups have
/// no key shortcut and scan the whole bucket, which stays small because
/// every entry expires.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use relay_storage::{CallRecord, CallStore, DEFAULT_RECORD_TTL};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = CallStore::in_memory(DEFAULT_RECORD_TTL);
/// let record = CallRecord {
///     request_id: "req-1".into(),
///     trace_id: "trace-1".into(),
///     started_at: Utc::now(),
///     ..Default::default()
/// };
///
/// let key = store.store(&record).await?;
/// assert_eq!(key, "trace-1.req-1");
/// assert_eq!(store.get(&key).await?, Some(record));
/// # Ok(())
/// # }
/// ```
pub struct RecordStore<R> {
    bucket: Arc<dyn KeyValueBucket>,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            bucket: Arc::clone(&self.bucket),
            _record: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for RecordStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("bucket", &self.bucket.name())
            .field("ttl", &self.bucket.ttl())
            .finish()
    }
}

impl<R: StoredRecord> RecordStore<R> {
    /// Store over an existing bucket.
    pub fn new(bucket: Arc<dyn KeyValueBucket>) -> Self {
        Self {
            bucket,
            _record: PhantomData,
        }
    }

    /// Store over a fresh in-memory bucket named after the record type.
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(Arc::new(MemoryBucket::new(R::BUCKET, ttl)))
    }

    /// Store over a filesystem bucket under `base_path`.
    pub fn on_disk(base_path: impl Into<PathBuf>, ttl: Duration) -> RelayResult<Self> {
        let bucket = FileSystemBucket::new(base_path, R::BUCKET, ttl)?;
        Ok(Self::new(Arc::new(bucket)))
    }

    /// Underlying bucket.
    pub fn bucket(&self) -> &Arc<dyn KeyValueBucket> {
        &self.bucket
    }

    /// Persist `record` and return its key.
    #[instrument(skip(self, record), fields(bucket = R::BUCKET, id = record.id()))]
    pub async fn store(&self, record: &R) -> RelayResult<String> {
        if record.id().is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::MissingId(R::ID_FIELD)).into());
        }

        let key = record.key();
        let data = serde_json::to_vec(record).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!("{}: {}", key, e)))
        })?;
        self.bucket.put(&key, data).await?;

        debug!(key = %key, "Stored record");
        Ok(key)
    }

    /// Record under `key`, or `None` when absent or expired.
    #[instrument(skip(self), fields(bucket = R::BUCKET))]
    pub async fn get(&self, key: &str) -> RelayResult<Option<R>> {
        let Some(data) = self.bucket.get(key).await? else {
            return Ok(None);
        };
        let record = decode(key, &data)?;
        Ok(Some(record))
    }

    /// All records of a trace, oldest first.
    #[instrument(skip(self), fields(bucket = R::BUCKET))]
    pub async fn get_by_trace(&self, trace_id: &str) -> RelayResult<Vec<R>> {
        if trace_id.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::MissingId("trace_id")).into());
        }

        let prefix = format!("{}.", trace_id);
        let keys: Vec<String> = self
            .bucket
            .keys()
            .await?
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .collect();

        // "T.sub.req" also carries the "T." prefix
        let records = self
            .load_sorted(keys, |record| record.trace_id() == trace_id)
            .await;
        debug!(trace_id, count = records.len(), "Loaded trace records");
        Ok(records)
    }

    /// All records of an agent loop, oldest first.
    #[instrument(skip(self), fields(bucket = R::BUCKET))]
    pub async fn get_by_loop(&self, loop_id: &str) -> RelayResult<Vec<R>> {
        if loop_id.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::MissingId("loop_id")).into());
        }

        let keys = self.bucket.keys().await?;
        let scanned = keys.len();
        let records = self
            .load_sorted(keys, |record| record.loop_id() == loop_id)
            .await;
        debug!(loop_id, scanned, count = records.len(), "Loaded loop records");
        Ok(records)
    }

    /// Remove the record under `key`.
    #[instrument(skip(self), fields(bucket = R::BUCKET))]
    pub async fn delete(&self, key: &str) -> RelayResult<()> {
        self.bucket.delete(key).await
    }

    /// Fetch and decode `keys`, keeping matches and sorting by start time.
    ///
    /// Entries that vanish between listing and reading, or fail to decode,
    /// are skipped.
    async fn load_sorted(&self, keys: Vec<String>, keep: impl Fn(&R) -> bool) -> Vec<R> {
        let mut records = Vec::with_capacity(keys.len());
        for key in keys {
            let data = match self.bucket.get(&key).await {
                Ok(Some(data)) => data,
                Ok(None) => continue,
                Err(e) => {
                    warn!(key = %key, error = %e, "Failed to get key");
                    continue;
                }
            };
            match decode::<R>(&key, &data) {
                Ok(record) if keep(&record) => records.push(record),
                Ok(_) => {}
                Err(e) => warn!(key = %key, error = %e, "Failed to decode record"),
            }
        }
        records.sort_by_key(|record| record.started_at());
        records
    }
}

fn decode<R: StoredRecord>(key: &str, data: &[u8]) -> Result<R, StorageError> {
    serde_json::from_slice(data).map_err(|e| {
        StorageError::new(StorageErrorKind::Deserialization(format!("{}: {}", key, e)))
    })
}
