//! Tests for the fail-once global stores.
//!
//! Each global is touched by exactly one test since the outcome is cached
//! for the whole test process.

use relay_error::{ConfigError, RelayErrorKind};
use relay_storage::{
    CallStore, DEFAULT_RECORD_TTL, ToolCallStore, current_call_store, current_tool_call_store,
    global_call_store, global_tool_call_store,
};
use std::sync::Arc;

#[test]
fn test_failed_initialization_is_cached() {
    let first = global_call_store(|| Err(ConfigError::new("store path unwritable").into()));
    assert!(first.is_err());

    let second = global_call_store(|| Ok(CallStore::in_memory(DEFAULT_RECORD_TTL)));
    let err = second.unwrap_err();
    assert!(matches!(err.kind(), RelayErrorKind::Storage(_)));
    assert!(err.to_string().contains("store path unwritable"));
    assert!(current_call_store().is_none());
}

#[test]
fn test_successful_initialization_is_shared() -> anyhow::Result<()> {
    let first = global_tool_call_store(|| Ok(ToolCallStore::in_memory(DEFAULT_RECORD_TTL)))?;
    let second = global_tool_call_store(|| panic!("initializer must not run twice"))?;

    assert!(Arc::ptr_eq(&first, &second));
    let current = current_tool_call_store().expect("initialized store");
    assert!(Arc::ptr_eq(&first, &current));
    Ok(())
}

#[test]
fn test_concurrent_initialization_yields_one_instance() {
    // Shares the tool-call global with the test above; either may run first.
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                global_tool_call_store(|| Ok(ToolCallStore::in_memory(DEFAULT_RECORD_TTL)))
            })
        })
        .collect();
    let stores: Vec<Arc<ToolCallStore>> = handles
        .into_iter()
        .map(|h| h.join().expect("init thread").expect("init succeeds"))
        .collect();
    assert!(stores.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}
