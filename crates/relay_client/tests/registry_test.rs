//! Tests for the static capability registry.

use relay_client::{RelayClient, StaticCapabilityRegistry};
use relay_core::Endpoint;
use relay_interface::CapabilityRegistry;
use relay_retry::{CapabilityConfig, RegistryConfig, RelayConfig};
use std::collections::HashMap;

#[test]
fn test_builtin_chains_put_preferred_first() {
    let registry = StaticCapabilityRegistry::builtin();
    assert_eq!(
        registry.resolve("planning"),
        vec!["claude-opus", "claude-sonnet", "qwen", "llama3.2"]
    );
    assert_eq!(registry.resolve("coding"), vec!["claude-sonnet", "codellama", "qwen"]);
    assert_eq!(
        registry.capabilities(),
        vec!["coding", "fast", "planning", "reviewing", "writing"]
    );
}

#[test]
fn test_every_builtin_candidate_has_an_endpoint() {
    let registry = StaticCapabilityRegistry::builtin();
    for capability in registry.capabilities() {
        for candidate in registry.resolve(&capability) {
            assert!(
                registry.endpoint_for(&candidate).is_some(),
                "{capability}: {candidate}"
            );
        }
    }
    let sonnet = registry.endpoint_for("claude-sonnet").expect("sonnet");
    assert_eq!(sonnet.provider, "anthropic");
    assert!(sonnet.base_url.is_empty());
    assert_eq!(sonnet.max_tokens_budget, 200_000);
    assert_eq!(
        registry.endpoint_for("codellama").map(|e| e.max_tokens_budget),
        Some(16_384)
    );
}

#[test]
fn test_unknown_capability_uses_default() {
    let registry = StaticCapabilityRegistry::builtin();
    assert_eq!(registry.resolve("poetry"), vec!["qwen"]);

    registry.set_default("claude-haiku");
    assert_eq!(registry.resolve("poetry"), vec!["claude-haiku"]);

    let empty = StaticCapabilityRegistry::default();
    assert!(empty.resolve("poetry").is_empty());
}

#[test]
fn test_runtime_updates_are_visible() {
    let registry = StaticCapabilityRegistry::builtin();
    registry.set_capability(
        "fast",
        CapabilityConfig {
            description: "Local only".to_string(),
            preferred: vec!["tiny".to_string()],
            fallback: Vec::new(),
        },
    );
    registry.set_endpoint("tiny", Endpoint::new("ollama", "phi3"));

    assert_eq!(registry.resolve("fast"), vec!["tiny"]);
    assert_eq!(registry.endpoint_for("tiny").map(|e| e.model), Some("phi3".to_string()));
    assert!(registry.endpoints().contains(&"tiny".to_string()));
}

#[test]
fn test_from_registry_config() {
    let config = RegistryConfig {
        capabilities: HashMap::from([(
            "writing".to_string(),
            CapabilityConfig {
                description: String::new(),
                preferred: vec!["remote".to_string()],
                fallback: vec!["local".to_string()],
            },
        )]),
        endpoints: HashMap::new(),
        default_model: None,
    };
    let registry = StaticCapabilityRegistry::from(config);
    assert_eq!(registry.resolve("writing"), vec!["remote", "local"]);
    assert!(registry.endpoint_for("remote").is_none());
}

#[tokio::test]
async fn test_client_from_config_uses_bundled_defaults() -> anyhow::Result<()> {
    let config = RelayConfig::load()?;
    let client = RelayClient::from_config(&config)?;
    assert_eq!(client.policy().max_attempts, config.retry.max_attempts);
    assert!(client.call_store().is_some());
    Ok(())
}
