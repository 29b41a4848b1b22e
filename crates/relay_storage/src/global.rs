//! Process-wide stores for call sites that cannot have one injected.
//!
//! Initialization is fail-once: the first call runs its initializer and the
//! outcome, success or failure, is kept for the life of the process. Later
//! calls ignore their initializer and return the cached outcome.

use crate::{CallStore, ToolCallStore};
use relay_error::{RelayResult, StorageError, StorageErrorKind};
use std::sync::{Arc, OnceLock};

type Slot<S> = OnceLock<Result<Arc<S>, StorageError>>;

static GLOBAL_CALL_STORE: Slot<CallStore> = OnceLock::new();
static GLOBAL_TOOL_CALL_STORE: Slot<ToolCallStore> = OnceLock::new();

fn init_once<S>(
    slot: &'static Slot<S>,
    init: impl FnOnce() -> RelayResult<S>,
) -> RelayResult<Arc<S>> {
    let outcome = slot.get_or_init(|| {
        init().map(Arc::new).map_err(|e| {
            tracing::error!(error = %e, "Global store initialization failed");
            StorageError::new(StorageErrorKind::Initialization(e.to_string()))
        })
    });
    match outcome {
        Ok(store) => Ok(Arc::clone(store)),
        Err(e) => Err(e.clone().into()),
    }
}

/// Initialize the global call store, or return the cached outcome.
///
/// # Examples
///
/// ```
/// use relay_storage::{CallStore, DEFAULT_RECORD_TTL, global_call_store};
/// use std::sync::Arc;
///
/// let first = global_call_store(|| Ok(CallStore::in_memory(DEFAULT_RECORD_TTL))).unwrap();
/// let second = global_call_store(|| unreachable!("already initialized")).unwrap();
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
pub fn global_call_store(
    init: impl FnOnce() -> RelayResult<CallStore>,
) -> RelayResult<Arc<CallStore>> {
    init_once(&GLOBAL_CALL_STORE, init)
}

/// Initialize the global tool-call store, or return the cached outcome.
pub fn global_tool_call_store(
    init: impl FnOnce() -> RelayResult<ToolCallStore>,
) -> RelayResult<Arc<ToolCallStore>> {
    init_once(&GLOBAL_TOOL_CALL_STORE, init)
}

/// The global call store, if it was initialized successfully.
pub fn current_call_store() -> Option<Arc<CallStore>> {
    GLOBAL_CALL_STORE.get()?.as_ref().ok().cloned()
}

/// The global tool-call store, if it was initialized successfully.
pub fn current_tool_call_store() -> Option<Arc<ToolCallStore>> {
    GLOBAL_TOOL_CALL_STORE.get()?.as_ref().ok().cloned()
}
