//! Provider registry: the configured set of model providers and the factory
//! that turns a resolved configuration into a live client.
//!
//! The registry is populated once at process start from whatever
//! configuration source the embedding application uses (env vars, files —
//! out of scope here) and is read-only thereafter. The orchestrator resolves
//! a [`ProviderSelector`] to a [`ProviderConfig`], then asks a
//! [`ClientFactory`] for the matching adapter. New vendors add an adapter to
//! [`VendorClientFactory`], never a branch at a call site.

use std::sync::Arc;

use crate::debatellm::client_wrapper::ClientWrapper;
use crate::debatellm::clients::deepseek::DeepSeekClient;
use crate::debatellm::clients::openai::OpenAIClient;
use crate::debatellm::error::DebateError;

/// Immutable record describing one configured model provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Registry key used by selectors.
    pub id: String,
    /// Vendor tag selecting the adapter, e.g. `"openai"` or `"deepseek"`.
    pub provider: String,
    /// Model identifier passed through to the vendor.
    pub model: String,
    /// API credential for the vendor.
    pub credential: String,
    /// Optional base URL override for compatible self-hosted deployments.
    pub base_url: Option<String>,
    /// Base sampling temperature for calls through this provider.
    pub temperature: f32,
}

/// How a caller names the provider for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderSelector {
    /// The registry's designated (or first-configured) provider.
    Default,
    /// An explicit provider id.
    Id(String),
}

impl ProviderSelector {
    /// Convenience constructor for an explicit id selector.
    pub fn id(id: impl Into<String>) -> Self {
        ProviderSelector::Id(id.into())
    }
}

/// Read-only set of configured providers, keyed by id.
pub struct ProviderRegistry {
    configs: Vec<ProviderConfig>,
    default_id: Option<String>,
}

impl ProviderRegistry {
    /// Build a registry from the startup configuration. The first config is
    /// the default provider unless [`ProviderRegistry::with_default`]
    /// designates another.
    pub fn new(configs: Vec<ProviderConfig>) -> Self {
        ProviderRegistry {
            configs,
            default_id: None,
        }
    }

    /// Designate the provider id that [`ProviderSelector::Default`] resolves to.
    pub fn with_default(mut self, id: impl Into<String>) -> Self {
        self.default_id = Some(id.into());
        self
    }

    /// Resolve a selector to concrete call parameters.
    pub fn resolve(&self, selector: &ProviderSelector) -> Result<&ProviderConfig, DebateError> {
        match selector {
            ProviderSelector::Default => match &self.default_id {
                Some(id) => self.find(id),
                None => self
                    .configs
                    .first()
                    .ok_or_else(|| DebateError::UnknownProvider("default".to_string())),
            },
            ProviderSelector::Id(id) => self.find(id),
        }
    }

    fn find(&self, id: &str) -> Result<&ProviderConfig, DebateError> {
        self.configs
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DebateError::UnknownProvider(id.to_string()))
    }

    /// Every configured provider, in configuration order. Used by the
    /// transport layer's provider-listing endpoint.
    pub fn list(&self) -> &[ProviderConfig] {
        &self.configs
    }
}

/// Turns a resolved [`ProviderConfig`] into a live client.
///
/// The orchestrator holds this behind an `Arc<dyn ClientFactory>` so tests
/// can inject scripted clients without any network.
pub trait ClientFactory: Send + Sync {
    fn connect(&self, config: &ProviderConfig) -> Result<Arc<dyn ClientWrapper>, DebateError>;
}

/// Default factory mapping vendor tags to the bundled adapters.
pub struct VendorClientFactory;

impl ClientFactory for VendorClientFactory {
    fn connect(&self, config: &ProviderConfig) -> Result<Arc<dyn ClientWrapper>, DebateError> {
        match config.provider.as_str() {
            "openai" => Ok(match &config.base_url {
                Some(base_url) => Arc::new(OpenAIClient::new_with_base_url(
                    &config.credential,
                    &config.model,
                    base_url,
                )),
                None => Arc::new(OpenAIClient::new_with_model_string(
                    &config.credential,
                    &config.model,
                )),
            }),
            "deepseek" => Ok(match &config.base_url {
                Some(base_url) => Arc::new(DeepSeekClient::new_with_base_url(
                    &config.credential,
                    &config.model,
                    base_url,
                )),
                None => Arc::new(DeepSeekClient::new_with_model_string(
                    &config.credential,
                    &config.model,
                )),
            }),
            other => Err(DebateError::UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(id: &str, provider: &str) -> ProviderConfig {
        ProviderConfig {
            id: id.to_string(),
            provider: provider.to_string(),
            model: "test-model".to_string(),
            credential: "test-key".to_string(),
            base_url: None,
            temperature: 0.7,
        }
    }

    #[test]
    fn default_resolves_to_first_configured() {
        let registry = ProviderRegistry::new(vec![config("a", "openai"), config("b", "deepseek")]);
        let resolved = registry.resolve(&ProviderSelector::Default).unwrap();
        assert_eq!(resolved.id, "a");
    }

    #[test]
    fn with_default_overrides_first() {
        let registry = ProviderRegistry::new(vec![config("a", "openai"), config("b", "deepseek")])
            .with_default("b");
        let resolved = registry.resolve(&ProviderSelector::Default).unwrap();
        assert_eq!(resolved.id, "b");
    }

    #[test]
    fn explicit_id_resolves() {
        let registry = ProviderRegistry::new(vec![config("a", "openai"), config("b", "deepseek")]);
        let resolved = registry.resolve(&ProviderSelector::id("b")).unwrap();
        assert_eq!(resolved.provider, "deepseek");
    }

    #[test]
    fn unknown_id_fails() {
        let registry = ProviderRegistry::new(vec![config("a", "openai")]);
        let err = registry.resolve(&ProviderSelector::id("zzz")).unwrap_err();
        assert_eq!(err.kind(), "unknown_provider");
    }

    #[test]
    fn empty_registry_has_no_default() {
        let registry = ProviderRegistry::new(vec![]);
        let err = registry.resolve(&ProviderSelector::Default).unwrap_err();
        assert_eq!(err.kind(), "unknown_provider");
    }

    #[test]
    fn factory_rejects_unknown_vendor_tag() {
        let err = VendorClientFactory
            .connect(&config("a", "acme-llm"))
            .err()
            .expect("unknown vendor should not connect");
        assert_eq!(err.kind(), "unknown_provider");
    }

    #[test]
    fn factory_builds_bundled_adapters() {
        let openai = VendorClientFactory.connect(&config("a", "openai")).unwrap();
        assert_eq!(openai.model_name(), "test-model");
        let deepseek = VendorClientFactory.connect(&config("b", "deepseek")).unwrap();
        assert_eq!(deepseek.model_name(), "test-model");
    }
}
