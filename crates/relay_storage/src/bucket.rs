//! Key-value bucket contract.

use async_trait::async_trait;
use relay_error::RelayResult;
use std::time::Duration;

/// A named, TTL-bounded key-value collection.
///
/// Every entry expires `ttl` after it was written; expiry is the only
/// eviction mechanism. Expired entries are invisible to `get` and `keys`.
/// Backends allow concurrent readers and writers without cross-key locking,
/// so a `keys` listing followed by `get`s may observe entries that vanished
/// in between.
#[async_trait]
pub trait KeyValueBucket: Send + Sync {
    /// Bucket name (e.g., "LLM_CALLS").
    fn name(&self) -> &str;

    /// Time-to-live applied to every entry. `Duration::ZERO` disables expiry.
    fn ttl(&self) -> Duration;

    /// Write `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> RelayResult<()>;

    /// Value under `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> RelayResult<Option<Vec<u8>>>;

    /// All live keys, in no particular order.
    async fn keys(&self) -> RelayResult<Vec<String>>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> RelayResult<()>;
}

/// True when an entry written `age` ago has outlived `ttl`.
pub(crate) fn is_expired(age: Duration, ttl: Duration) -> bool {
    !ttl.is_zero() && age >= ttl
}
