//! Configuration for the orchestrator, pricing cache and provider endpoints
//!
//! Every type has working defaults; `from_env` overlays environment variables and
//! `validate` rejects values the engine cannot run with.

use crate::error::{LlmError, LlmResult};
use crate::internals::retry::RetryPolicy;
use crate::logging::log_debug;
use crate::pricing::PricingEntry;
use crate::providers::Provider;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_TOOL_ITERATIONS: usize = 5;
pub const DEFAULT_PRICING_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_PRICING_URL: &str = "https://openrouter.ai/api/v1/models";
pub const DEFAULT_PRICING_RETRY_COOLDOWN: Duration = Duration::from_secs(5 * 60);

fn default_retry_cooldown() -> Duration {
    DEFAULT_PRICING_RETRY_COOLDOWN
}

/// Pricing cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// How long a fetched pricing table stays valid
    pub ttl: Duration,
    /// Used when no table entry matches a model
    pub default_entry: Option<PricingEntry>,
    /// Endpoint of the OpenRouter-style models listing
    pub source_url: String,
    /// Minimum wait after a failed refresh before the source is asked again
    #[serde(default = "default_retry_cooldown")]
    pub retry_cooldown: Duration,
    /// File keeping the last fetched table across restarts
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_PRICING_TTL,
            default_entry: None,
            source_url: DEFAULT_PRICING_URL.to_string(),
            retry_cooldown: DEFAULT_PRICING_RETRY_COOLDOWN,
            cache_path: None,
        }
    }
}

impl PricingConfig {
    /// Validate pricing settings
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] for a zero TTL, an empty source URL,
    /// or a default entry with negative or non-finite prices.
    pub fn validate(&self) -> LlmResult<()> {
        if self.ttl.is_zero() {
            return Err(LlmError::configuration_error(
                "Pricing TTL must be greater than zero",
            ));
        }
        if self.source_url.trim().is_empty() {
            return Err(LlmError::configuration_error(
                "Pricing source URL must not be empty",
            ));
        }
        if let Some(entry) = &self.default_entry {
            let prices = [entry.input_price_per_token, entry.output_price_per_token];
            if prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
                return Err(LlmError::configuration_error(
                    "Default pricing entry must have finite, non-negative prices",
                ));
            }
        }
        Ok(())
    }
}

/// Orchestrator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Upper bound on tool execution rounds per `ask`
    pub max_tool_iterations: usize,
    pub pricing: PricingConfig,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: DEFAULT_MAX_TOOL_ITERATIONS,
            pricing: PricingConfig::default(),
        }
    }
}

impl HelperConfig {
    /// Defaults overlaid with `AI_HELPER_*` environment variables.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `AI_HELPER_MAX_TOOL_ITERATIONS` | `max_tool_iterations` |
    /// | `AI_HELPER_PRICING_TTL_SECS` | `pricing.ttl` |
    /// | `AI_HELPER_DEFAULT_INPUT_PRICE` + `AI_HELPER_DEFAULT_OUTPUT_PRICE` | `pricing.default_entry` |
    /// | `AI_HELPER_PRICING_URL` | `pricing.source_url` |
    /// | `AI_HELPER_PRICING_RETRY_SECS` | `pricing.retry_cooldown` |
    /// | `AI_HELPER_PRICING_CACHE` | `pricing.cache_path` |
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] for unparsable values, for only one
    /// of the two default prices being set, or when the result fails validation.
    pub fn from_env() -> LlmResult<Self> {
        let mut config = Self::default();

        if let Some(iterations) = env_parse::<usize>("AI_HELPER_MAX_TOOL_ITERATIONS")? {
            config.max_tool_iterations = iterations;
        }
        if let Some(ttl_secs) = env_parse::<u64>("AI_HELPER_PRICING_TTL_SECS")? {
            config.pricing.ttl = Duration::from_secs(ttl_secs);
        }
        if let Some(url) = env_string("AI_HELPER_PRICING_URL") {
            config.pricing.source_url = url;
        }
        if let Some(cooldown_secs) = env_parse::<u64>("AI_HELPER_PRICING_RETRY_SECS")? {
            config.pricing.retry_cooldown = Duration::from_secs(cooldown_secs);
        }
        if let Some(cache_path) = env_string("AI_HELPER_PRICING_CACHE") {
            config.pricing.cache_path = Some(PathBuf::from(cache_path));
        }

        let input = env_parse::<f64>("AI_HELPER_DEFAULT_INPUT_PRICE")?;
        let output = env_parse::<f64>("AI_HELPER_DEFAULT_OUTPUT_PRICE")?;
        config.pricing.default_entry = match (input, output) {
            (Some(input), Some(output)) => Some(PricingEntry::new("default", input, output)),
            (None, None) => None,
            _ => {
                return Err(LlmError::configuration_error(
                    "AI_HELPER_DEFAULT_INPUT_PRICE and AI_HELPER_DEFAULT_OUTPUT_PRICE must be set together",
                ))
            }
        };

        config.validate()?;

        log_debug!(
            max_tool_iterations = config.max_tool_iterations,
            pricing_ttl_secs = config.pricing.ttl.as_secs(),
            has_default_pricing = config.pricing.default_entry.is_some(),
            has_pricing_cache = config.pricing.cache_path.is_some(),
            "Helper configuration loaded from environment"
        );

        Ok(config)
    }

    /// Validate helper settings
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] when `max_tool_iterations` is zero
    /// or the pricing settings are invalid.
    pub fn validate(&self) -> LlmResult<()> {
        if self.max_tool_iterations == 0 {
            return Err(LlmError::configuration_error(
                "max_tool_iterations must be at least 1",
            ));
        }
        self.pricing.validate()
    }
}

/// Endpoint settings for one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub api_key: Option<String>,
    /// Base URL of the provider's OpenAI-compatible API
    pub base_url: String,
    pub retry_policy: RetryPolicy,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            retry_policy: RetryPolicy::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Validate provider settings
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] when the base URL is not http(s).
    pub fn validate(&self) -> LlmResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(LlmError::configuration_error(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Settings for every supported provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    pub openai: ProviderSettings,
    pub anthropic: ProviderSettings,
    pub google: ProviderSettings,
    pub openrouter: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::new(Provider::OpenAi.default_base_url()),
            anthropic: ProviderSettings::new(Provider::Anthropic.default_base_url()),
            google: ProviderSettings::new(Provider::Google.default_base_url()),
            openrouter: ProviderSettings::new(Provider::OpenRouter.default_base_url()),
        }
    }
}

impl ProvidersConfig {
    /// Defaults overlaid with API keys and `*_BASE_URL` overrides from the environment.
    ///
    /// Google reads `GEMINI_API_KEY` first and falls back to `GOOGLE_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] when an override URL is invalid.
    pub fn from_env() -> LlmResult<Self> {
        let mut config = Self::default();

        for provider in Provider::ALL {
            let settings = config.settings_mut(provider);
            let api_key = match provider {
                Provider::OpenAi => env_string("OPENAI_API_KEY"),
                Provider::Anthropic => env_string("ANTHROPIC_API_KEY"),
                Provider::Google => {
                    env_string("GEMINI_API_KEY").or_else(|| env_string("GOOGLE_API_KEY"))
                }
                Provider::OpenRouter => env_string("OPENROUTER_API_KEY"),
            };
            if api_key.is_some() {
                settings.api_key = api_key;
            }

            let base_url_var = match provider {
                Provider::OpenAi => "OPENAI_BASE_URL",
                Provider::Anthropic => "ANTHROPIC_BASE_URL",
                Provider::Google => "GEMINI_BASE_URL",
                Provider::OpenRouter => "OPENROUTER_BASE_URL",
            };
            if let Some(base_url) = env_string(base_url_var) {
                settings.base_url = base_url;
            }

            settings.validate()?;

            log_debug!(
                provider = %provider,
                base_url = %settings.base_url,
                has_api_key = settings.api_key.is_some(),
                "Provider settings loaded"
            );
        }

        Ok(config)
    }

    pub fn settings(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Google => &self.google,
            Provider::OpenRouter => &self.openrouter,
        }
    }

    pub fn settings_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        match provider {
            Provider::OpenAi => &mut self.openai,
            Provider::Anthropic => &mut self.anthropic,
            Provider::Google => &mut self.google,
            Provider::OpenRouter => &mut self.openrouter,
        }
    }
}

/// Non-empty value of an environment variable
fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_parse<T: FromStr>(name: &str) -> LlmResult<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env_string(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| {
                LlmError::configuration_error(format!("Invalid value for {name} ('{raw}'): {e}"))
            })
        })
        .transpose()
}
