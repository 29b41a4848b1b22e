//! In-memory bucket.

use crate::bucket::{KeyValueBucket, is_expired};
use async_trait::async_trait;
use parking_lot::RwLock;
use relay_error::RelayResult;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    written_at: Instant,
}

/// Process-local bucket backed by a hash map.
///
/// Expiry is checked on read. `get` drops an expired entry and `keys`
/// sweeps every expired entry out of the map.
///
/// # Examples
///
/// ```
/// use relay_storage::{KeyValueBucket, MemoryBucket};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bucket = MemoryBucket::new("LLM_CALLS", Duration::from_secs(60));
/// bucket.put("trace-1.req-1", b"{}".to_vec()).await?;
/// assert_eq!(bucket.get("trace-1.req-1").await?, Some(b"{}".to_vec()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MemoryBucket {
    name: String,
    ttl: Duration,
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryBucket {
    /// Empty bucket.
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Entries currently held, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the map holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn expired(&self, entry: &Entry) -> bool {
        is_expired(entry.written_at.elapsed(), self.ttl)
    }
}

#[async_trait]
impl KeyValueBucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> RelayResult<()> {
        self.entries.write().insert(
            key.to_string(),
            Entry {
                value,
                written_at: Instant::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> RelayResult<Option<Vec<u8>>> {
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if !self.expired(entry) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|entry| self.expired(entry)) {
            entries.remove(key);
            tracing::trace!(bucket = %self.name, key, "Dropped expired entry");
        }
        Ok(None)
    }

    async fn keys(&self) -> RelayResult<Vec<String>> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !self.expired(entry));
        let swept = before - entries.len();
        if swept > 0 {
            tracing::trace!(bucket = %self.name, swept, "Swept expired entries");
        }
        Ok(entries.keys().cloned().collect())
    }

    async fn delete(&self, key: &str) -> RelayResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}
