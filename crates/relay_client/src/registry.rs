//! Static capability registry.

use parking_lot::RwLock;
use relay_core::Endpoint;
use relay_interface::CapabilityRegistry;
use relay_retry::{CapabilityConfig, RegistryConfig};
use std::collections::HashMap;
use tracing::debug;

/// Capability registry backed by a fixed table, adjustable at runtime.
///
/// `resolve` returns the capability's preferred candidates followed by its
/// fallbacks. Unknown capabilities resolve to the default model alone, or to
/// nothing when no default is configured.
///
/// # Examples
///
/// ```
/// use relay_client::StaticCapabilityRegistry;
/// use relay_interface::CapabilityRegistry;
///
/// let registry = StaticCapabilityRegistry::builtin();
/// assert_eq!(registry.resolve("fast"), vec!["claude-haiku", "qwen"]);
/// assert_eq!(registry.resolve("unheard-of"), vec!["qwen"]);
///
/// let endpoint = registry.endpoint_for("qwen").unwrap();
/// assert_eq!(endpoint.provider, "ollama");
/// ```
#[derive(Debug, Default)]
pub struct StaticCapabilityRegistry {
    table: RwLock<RegistryConfig>,
}

impl From<RegistryConfig> for StaticCapabilityRegistry {
    fn from(config: RegistryConfig) -> Self {
        Self::new(config)
    }
}

fn capability(description: &str, preferred: &[&str], fallback: &[&str]) -> CapabilityConfig {
    CapabilityConfig {
        description: description.to_string(),
        preferred: preferred.iter().map(|s| s.to_string()).collect(),
        fallback: fallback.iter().map(|s| s.to_string()).collect(),
    }
}

impl StaticCapabilityRegistry {
    /// Registry over `config`.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            table: RwLock::new(config),
        }
    }

    /// Built-in table: Claude models on Anthropic preferred, local models on
    /// Ollama as fallbacks.
    pub fn builtin() -> Self {
        let capabilities = HashMap::from([
            (
                "planning".to_string(),
                capability(
                    "High-level reasoning, architecture decisions",
                    &["claude-opus", "claude-sonnet"],
                    &["qwen", "llama3.2"],
                ),
            ),
            (
                "writing".to_string(),
                capability(
                    "Documentation, proposals, specifications",
                    &["claude-sonnet"],
                    &["claude-haiku", "qwen"],
                ),
            ),
            (
                "coding".to_string(),
                capability(
                    "Code generation, implementation",
                    &["claude-sonnet"],
                    &["codellama", "qwen"],
                ),
            ),
            (
                "reviewing".to_string(),
                capability(
                    "Code review, quality analysis",
                    &["claude-sonnet"],
                    &["claude-haiku", "qwen"],
                ),
            ),
            (
                "fast".to_string(),
                capability("Quick responses, simple tasks", &["claude-haiku"], &["qwen"]),
            ),
        ]);

        let ollama = "http://localhost:11434/v1";
        let endpoints = HashMap::from([
            (
                "claude-opus".to_string(),
                Endpoint::new("anthropic", "claude-opus-4-5-20251101").with_budget(200_000),
            ),
            (
                "claude-sonnet".to_string(),
                Endpoint::new("anthropic", "claude-sonnet-4-20250514").with_budget(200_000),
            ),
            (
                "claude-haiku".to_string(),
                Endpoint::new("anthropic", "claude-haiku-3-5-20241022").with_budget(200_000),
            ),
            (
                "qwen".to_string(),
                Endpoint::new("ollama", "qwen2.5-coder:14b")
                    .with_base_url(ollama)
                    .with_budget(128_000),
            ),
            (
                "llama3.2".to_string(),
                Endpoint::new("ollama", "llama3.2")
                    .with_base_url(ollama)
                    .with_budget(128_000),
            ),
            (
                "codellama".to_string(),
                Endpoint::new("ollama", "codellama")
                    .with_base_url(ollama)
                    .with_budget(16_384),
            ),
        ]);

        Self::new(RegistryConfig {
            capabilities,
            endpoints,
            default_model: Some("qwen".to_string()),
        })
    }

    /// Add or replace a capability.
    pub fn set_capability(&self, name: impl Into<String>, config: CapabilityConfig) {
        let name = name.into();
        debug!(capability = %name, "Setting capability");
        self.table.write().capabilities.insert(name, config);
    }

    /// Add or replace an endpoint.
    pub fn set_endpoint(&self, name: impl Into<String>, endpoint: Endpoint) {
        let name = name.into();
        debug!(candidate = %name, provider = %endpoint.provider, "Setting endpoint");
        self.table.write().endpoints.insert(name, endpoint);
    }

    /// Set the candidate used for unknown capabilities.
    pub fn set_default(&self, name: impl Into<String>) {
        self.table.write().default_model = Some(name.into());
    }

    /// Configured capability names, sorted.
    pub fn capabilities(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.read().capabilities.keys().cloned().collect();
        names.sort();
        names
    }

    /// Configured candidate names, sorted.
    pub fn endpoints(&self) -> Vec<String> {
        let mut names: Vec<String> = self.table.read().endpoints.keys().cloned().collect();
        names.sort();
        names
    }
}

impl CapabilityRegistry for StaticCapabilityRegistry {
    fn resolve(&self, capability: &str) -> Vec<String> {
        let table = self.table.read();
        match table.capabilities.get(capability) {
            Some(config) => config
                .preferred
                .iter()
                .chain(&config.fallback)
                .cloned()
                .collect(),
            None => table.default_model.iter().cloned().collect(),
        }
    }

    fn endpoint_for(&self, candidate: &str) -> Option<Endpoint> {
        self.table.read().endpoints.get(candidate).cloned()
    }
}
