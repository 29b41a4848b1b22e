//! Registry of provider adapters keyed by provider name.

use crate::{AnthropicAdapter, OllamaAdapter, OpenAiAdapter};
use parking_lot::RwLock;
use relay_interface::ProviderAdapter;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

static GLOBAL_REGISTRY: OnceLock<Arc<AdapterRegistry>> = OnceLock::new();

/// Name to adapter mapping shared by concurrent calls.
///
/// Lookups vastly outnumber registrations, so the map sits behind a
/// read-write lock.
///
/// # Examples
///
/// ```
/// use relay_models::AdapterRegistry;
///
/// let registry = AdapterRegistry::with_defaults();
/// assert!(registry.get("anthropic").is_some());
/// assert!(registry.get("ollama").is_some());
/// assert!(registry.get("bedrock").is_none());
/// ```
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: RwLock<HashMap<String, Arc<dyn ProviderAdapter>>>,
}

impl std::fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

impl AdapterRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in adapters: anthropic, ollama and openai.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register(Arc::new(AnthropicAdapter::new()));
        registry.register(Arc::new(OllamaAdapter::new()));
        registry.register(Arc::new(OpenAiAdapter::new()));
        registry
    }

    /// Process-wide registry, created with the built-in adapters on first use.
    pub fn global() -> Arc<AdapterRegistry> {
        GLOBAL_REGISTRY
            .get_or_init(|| Arc::new(Self::with_defaults()))
            .clone()
    }

    /// Register an adapter under its own name, replacing any previous one.
    pub fn register(&self, adapter: Arc<dyn ProviderAdapter>) {
        let name = adapter.name().to_string();
        debug!(provider = %name, "Registering provider adapter");
        self.adapters.write().insert(name, adapter);
    }

    /// Adapter registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.read().get(name).cloned()
    }

    /// Registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.read().keys().cloned().collect();
        names.sort();
        names
    }
}
