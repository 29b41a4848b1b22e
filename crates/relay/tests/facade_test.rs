//! Tests for the facade crate.

use relay::{
    CallContext, CallStore, CapabilityRegistry, Format, RelayClient, StaticCapabilityRegistry,
    TelemetryConfig, Trajectory, init_tracing_with_config,
};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_second_subscriber_install_fails_cleanly() {
    let config = TelemetryConfig::new().with_log_level("warn").with_json_logs(true);
    let first = init_tracing_with_config(config.clone());
    let second = init_tracing_with_config(config);
    assert!(first.is_ok());
    assert!(second.is_err());
}

#[test]
fn test_reexports_compose() -> anyhow::Result<()> {
    let registry = Arc::new(StaticCapabilityRegistry::builtin());
    assert!(!registry.resolve("writing").is_empty());

    let client = RelayClient::builder(registry)
        .call_store(Arc::new(CallStore::in_memory(Duration::from_secs(60))))
        .build()?;
    assert!(client.call_store().is_some());

    let ctx = CallContext::new();
    assert!(!ctx.is_cancelled());

    let empty = Trajectory::build(&Default::default(), &[], &[], Format::Summary);
    assert_eq!(empty.model_calls, 0);
    Ok(())
}
