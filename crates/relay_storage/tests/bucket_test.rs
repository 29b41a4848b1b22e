//! Tests for the in-memory and filesystem buckets.

use relay_storage::{FileSystemBucket, KeyValueBucket, MemoryBucket};
use std::time::Duration;

async fn exercise_basic_operations(bucket: &dyn KeyValueBucket) -> anyhow::Result<()> {
    bucket.put("trace-1.req-1", b"one".to_vec()).await?;
    bucket.put("trace-1.req-2", b"two".to_vec()).await?;
    bucket.put("trace-1.req-1", b"uno".to_vec()).await?;

    assert_eq!(bucket.get("trace-1.req-1").await?, Some(b"uno".to_vec()));
    assert_eq!(bucket.get("missing").await?, None);

    let mut keys = bucket.keys().await?;
    keys.sort();
    assert_eq!(keys, vec!["trace-1.req-1", "trace-1.req-2"]);

    bucket.delete("trace-1.req-2").await?;
    bucket.delete("trace-1.req-2").await?;
    assert_eq!(bucket.keys().await?, vec!["trace-1.req-1"]);
    Ok(())
}

#[tokio::test]
async fn test_memory_bucket_operations() -> anyhow::Result<()> {
    let bucket = MemoryBucket::new("LLM_CALLS", Duration::from_secs(60));
    exercise_basic_operations(&bucket).await
}

#[tokio::test]
async fn test_filesystem_bucket_operations() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bucket = FileSystemBucket::new(dir.path(), "LLM_CALLS", Duration::from_secs(60))?;
    assert!(bucket.dir().ends_with("LLM_CALLS"));
    exercise_basic_operations(&bucket).await
}

#[tokio::test]
async fn test_memory_bucket_expires_entries() -> anyhow::Result<()> {
    let bucket = MemoryBucket::new("LLM_CALLS", Duration::from_millis(50));
    bucket.put("k", b"v".to_vec()).await?;
    assert!(bucket.get("k").await?.is_some());

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(bucket.get("k").await?.is_none());
    assert!(bucket.keys().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_zero_ttl_never_expires() -> anyhow::Result<()> {
    let bucket = MemoryBucket::new("LLM_CALLS", Duration::ZERO);
    bucket.put("k", b"v".to_vec()).await?;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(bucket.get("k").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_filesystem_bucket_purges_expired_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bucket = FileSystemBucket::new(dir.path(), "LLM_CALLS", Duration::from_millis(50))?;
    bucket.put("T.req-1", b"{}".to_vec()).await?;
    let file = bucket.dir().join("T.req-1.json");
    assert!(file.exists());

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(bucket.keys().await?.is_empty());
    assert!(bucket.get("T.req-1").await?.is_none());
    assert!(!file.exists());
    Ok(())
}

#[tokio::test]
async fn test_filesystem_bucket_survives_reopen() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    {
        let bucket = FileSystemBucket::new(dir.path(), "TOOL_CALLS", Duration::from_secs(60))?;
        bucket.put("T.call-1", b"{\"ok\":true}".to_vec()).await?;
    }
    let reopened = FileSystemBucket::new(dir.path(), "TOOL_CALLS", Duration::from_secs(60))?;
    assert_eq!(reopened.get("T.call-1").await?, Some(b"{\"ok\":true}".to_vec()));
    Ok(())
}

#[tokio::test]
async fn test_filesystem_bucket_rejects_unsafe_keys() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bucket = FileSystemBucket::new(dir.path(), "LLM_CALLS", Duration::from_secs(60))?;

    for key in ["", "../escape", "a/b", ".hidden", "with space"] {
        assert!(bucket.put(key, b"x".to_vec()).await.is_err(), "{key:?}");
    }
    assert!(bucket.keys().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_filesystem_bucket_ignores_foreign_files() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bucket = FileSystemBucket::new(dir.path(), "LLM_CALLS", Duration::from_secs(60))?;
    std::fs::write(bucket.dir().join(".leftover.tmp"), b"partial")?;
    std::fs::write(bucket.dir().join("notes.txt"), b"hello")?;
    bucket.put("T.req-1", b"{}".to_vec()).await?;

    assert_eq!(bucket.keys().await?, vec!["T.req-1"]);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_writers_on_distinct_keys() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bucket = std::sync::Arc::new(FileSystemBucket::new(
        dir.path(),
        "LLM_CALLS",
        Duration::from_secs(60),
    )?);

    let mut handles = Vec::new();
    for i in 0..16 {
        let bucket = std::sync::Arc::clone(&bucket);
        handles.push(tokio::spawn(async move {
            bucket.put(&format!("T.req-{i}"), vec![i as u8]).await
        }));
    }
    for handle in handles {
        handle.await??;
    }
    assert_eq!(bucket.keys().await?.len(), 16);
    Ok(())
}

#[tokio::test]
async fn test_memory_bucket_scan_sweeps_expired_entries() -> anyhow::Result<()> {
    let bucket = MemoryBucket::new("LLM_CALLS", Duration::from_millis(50));
    bucket.put("T.req-1", b"{}".to_vec()).await?;
    bucket.put("T.req-2", b"{}".to_vec()).await?;
    bucket.put("U.req-3", b"{}".to_vec()).await?;
    assert_eq!(bucket.len(), 3);

    tokio::time::sleep(Duration::from_millis(150)).await;
    bucket.put("V.req-4", b"{}".to_vec()).await?;
    assert_eq!(bucket.len(), 4);

    assert_eq!(bucket.keys().await?, vec!["V.req-4"]);
    assert_eq!(bucket.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_filesystem_scan_removes_expired_files_without_get() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let bucket = FileSystemBucket::new(dir.path(), "LLM_CALLS", Duration::from_millis(50))?;
    bucket.put("T.req-1", b"{}".to_vec()).await?;
    bucket.put("U.req-2", b"{}".to_vec()).await?;

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(bucket.keys().await?.is_empty());

    let remaining = std::fs::read_dir(bucket.dir())?.count();
    assert_eq!(remaining, 0);
    Ok(())
}
