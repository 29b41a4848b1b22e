//! Filesystem-backed bucket.
//!
//! Each key is one file, `{base_path}/{bucket}/{key}.json`, holding the raw
//! value. The file's modification time is the write time used for expiry.

use crate::bucket::{KeyValueBucket, is_expired};
use async_trait::async_trait;
use relay_error::{RelayResult, StorageError, StorageErrorKind};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use uuid::Uuid;

const ENTRY_EXTENSION: &str = "json";

/// Filesystem bucket.
///
/// # Example Structure
///
/// ```text
/// /var/lib/relay/
/// ├── LLM_CALLS/
/// │   ├── trace-1.req-1.json
/// │   └── req-9.json
/// └── TOOL_CALLS/
///     └── trace-1.call-1.json
/// ```
///
/// # Features
///
/// - **Atomic writes**: temp file + rename, so readers never see a torn value
/// - **Lazy expiry**: expired files are removed by both `get` and `keys`
/// - **Key validation**: keys that could escape the bucket directory are rejected
#[derive(Debug, Clone)]
pub struct FileSystemBucket {
    name: String,
    ttl: Duration,
    dir: PathBuf,
}

impl FileSystemBucket {
    /// Open (creating if needed) the bucket `name` under `base_path`.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path, ttl))]
    pub fn new(base_path: impl Into<PathBuf>, name: &str, ttl: Duration) -> RelayResult<Self> {
        validate_key(name)?;
        let dir = base_path.into().join(name);

        std::fs::create_dir_all(&dir).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                dir.display(),
                e
            )))
        })?;

        tracing::info!(path = %dir.display(), "Opened filesystem bucket");
        Ok(Self {
            name: name.to_string(),
            ttl,
            dir,
        })
    }

    /// Directory holding this bucket's entries.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION))
    }

    async fn entry_expired(&self, path: &Path) -> Option<bool> {
        let modified = tokio::fs::metadata(path).await.ok()?.modified().ok()?;
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        Some(is_expired(age, self.ttl))
    }

    /// Remove an expired entry. A concurrent purge of the same file is fine.
    async fn purge(&self, key: &str, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(key, "Purged expired entry"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(key, error = %e, "Failed to purge expired entry"),
        }
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let allowed = key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '='));
    if key.is_empty() || key.starts_with('.') || key.contains("..") || !allowed {
        return Err(StorageError::new(StorageErrorKind::InvalidKey(
            key.to_string(),
        )));
    }
    Ok(())
}

#[async_trait]
impl KeyValueBucket for FileSystemBucket {
    fn name(&self) -> &str {
        &self.name
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }

    #[tracing::instrument(skip(self, value), fields(bucket = %self.name, size = value.len()))]
    async fn put(&self, key: &str, value: Vec<u8>) -> RelayResult<()> {
        validate_key(key)?;
        let path = self.entry_path(key);

        // Unique temp name so concurrent writers of one key never share a file
        let temp_path = self.dir.join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        tokio::fs::write(&temp_path, &value).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
            .into());
        }

        tracing::debug!(key, path = %path.display(), "Stored entry");
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.name))]
    async fn get(&self, key: &str) -> RelayResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let path = self.entry_path(key);

        if self.entry_expired(&path).await == Some(true) {
            self.purge(key, &path).await;
            return Ok(None);
        }

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::new(StorageErrorKind::Read(format!(
                "{}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.name))]
    async fn keys(&self) -> RelayResult<Vec<String>> {
        let list_error = |e: std::io::Error| {
            StorageError::new(StorageErrorKind::ListKeys(format!(
                "{}: {}",
                self.dir.display(),
                e
            )))
        };

        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(list_error)?;
        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_error)? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            if file_name.starts_with('.') {
                continue;
            }
            let Some(key) = file_name
                .strip_suffix(ENTRY_EXTENSION)
                .and_then(|stem| stem.strip_suffix('.'))
            else {
                continue;
            };
            match self.entry_expired(&entry.path()).await {
                Some(false) => keys.push(key.to_string()),
                Some(true) => self.purge(key, &entry.path()).await,
                None => {}
            }
        }
        Ok(keys)
    }

    #[tracing::instrument(skip(self), fields(bucket = %self.name))]
    async fn delete(&self, key: &str) -> RelayResult<()> {
        validate_key(key)?;
        let path = self.entry_path(key);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key, path = %path.display(), "Deleted entry");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::Write(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
            .into()),
        }
    }
}
