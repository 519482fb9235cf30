//! Adapter construction keyed by provider

use crate::config::{ProviderSettings, ProvidersConfig};
use crate::core_types::Adapter;
use crate::error::{LlmError, LlmResult};
use crate::logging::log_debug;
use crate::providers::model_id::{ModelIdentifier, Provider};
use crate::providers::openai_compatible::OpenAiCompatibleAdapter;

use std::collections::HashMap;
use std::sync::Arc;

/// Builds an adapter for one model
pub type AdapterConstructor =
    dyn Fn(&ModelIdentifier) -> LlmResult<Arc<dyn Adapter>> + Send + Sync;

/// Maps each [`Provider`] to exactly one adapter constructor.
///
/// ```rust
/// use ai_helper::{AdapterFactory, ModelIdentifier, ProvidersConfig};
///
/// let mut config = ProvidersConfig::default();
/// config.openai.api_key = Some("sk-test".to_string());
///
/// let factory = AdapterFactory::from_config(&config);
/// let model = ModelIdentifier::parse("openai:gpt-4o-mini").unwrap();
/// let adapter = factory.create(&model).unwrap();
/// assert_eq!(adapter.provider_name(), "openai");
/// ```
#[derive(Clone, Default)]
pub struct AdapterFactory {
    constructors: HashMap<Provider, Arc<AdapterConstructor>>,
}

impl std::fmt::Debug for AdapterFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<&str> = self.constructors.keys().map(Provider::tag).collect();
        providers.sort_unstable();
        f.debug_struct("AdapterFactory")
            .field("providers", &providers)
            .finish()
    }
}

impl AdapterFactory {
    /// Factory without any registered provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory serving every provider through its OpenAI-compatible endpoint
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut factory = Self::new();
        for provider in Provider::ALL {
            let settings: ProviderSettings = config.settings(provider).clone();
            factory.register(provider, move |model| {
                let adapter = OpenAiCompatibleAdapter::new(model.clone(), settings.clone())?;
                Ok(Arc::new(adapter) as Arc<dyn Adapter>)
            });
        }
        factory
    }

    /// Set the constructor for `provider`, replacing any previous one
    pub fn register<F>(&mut self, provider: Provider, constructor: F)
    where
        F: Fn(&ModelIdentifier) -> LlmResult<Arc<dyn Adapter>> + Send + Sync + 'static,
    {
        self.constructors.insert(provider, Arc::new(constructor));
    }

    pub fn supports(&self, provider: Provider) -> bool {
        self.constructors.contains_key(&provider)
    }

    /// Build the adapter serving `model`
    ///
    /// # Errors
    ///
    /// [`LlmError::UnsupportedProvider`] when no constructor is registered for the
    /// model's provider, or whatever the constructor itself reports.
    pub fn create(&self, model: &ModelIdentifier) -> LlmResult<Arc<dyn Adapter>> {
        let constructor = self
            .constructors
            .get(&model.provider())
            .ok_or_else(|| LlmError::unsupported_provider(model.provider().tag()))?;

        log_debug!(model = %model, "Creating adapter");
        constructor(model)
    }
}
