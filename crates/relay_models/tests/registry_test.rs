//! Tests for the adapter registry.

use relay_core::CompletionResponse;
use relay_error::ProviderError;
use relay_interface::{ProviderAdapter, WireRequest};
use relay_models::AdapterRegistry;
use reqwest::header::HeaderMap;
use std::sync::Arc;

struct EchoAdapter;

impl ProviderAdapter for EchoAdapter {
    fn name(&self) -> &str {
        "echo"
    }

    fn build_url(&self, base_url: &str) -> String {
        base_url.to_string()
    }

    fn set_auth(&self, _headers: &mut HeaderMap) -> Result<(), ProviderError> {
        Ok(())
    }

    fn build_body(&self, request: &WireRequest<'_>) -> Result<Vec<u8>, ProviderError> {
        Ok(request.model.as_bytes().to_vec())
    }

    fn parse_response(
        &self,
        body: &[u8],
        requested_model: &str,
    ) -> Result<CompletionResponse, ProviderError> {
        Ok(CompletionResponse {
            content: String::from_utf8_lossy(body).into_owned(),
            model: requested_model.to_string(),
            ..Default::default()
        })
    }
}

#[test]
fn test_defaults_cover_builtin_providers() {
    let registry = AdapterRegistry::with_defaults();
    assert_eq!(registry.names(), vec!["anthropic", "ollama", "openai"]);
}

#[test]
fn test_register_and_lookup_custom_adapter() {
    let registry = AdapterRegistry::new();
    assert!(registry.get("echo").is_none());

    registry.register(Arc::new(EchoAdapter));
    let adapter = registry.get("echo").expect("registered adapter");
    assert_eq!(adapter.name(), "echo");
}

#[test]
fn test_global_registry_is_shared() {
    let first = AdapterRegistry::global();
    let second = AdapterRegistry::global();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.get("anthropic").is_some());
}

#[test]
fn test_concurrent_lookups_during_registration() {
    let registry = Arc::new(AdapterRegistry::with_defaults());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                if i == 0 {
                    registry.register(Arc::new(EchoAdapter));
                }
                for _ in 0..100 {
                    assert!(registry.get("ollama").is_some());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("lookup thread");
    }
    assert!(registry.get("echo").is_some());
}
