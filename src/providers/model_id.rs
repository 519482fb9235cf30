//! Provider tags and `provider:model` identifiers

use crate::error::{LlmError, LlmResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Google,
    OpenRouter,
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Google,
        Provider::OpenRouter,
    ];

    /// Canonical tag used in `provider:model` identifiers
    pub fn tag(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Google => "google",
            Self::OpenRouter => "openrouter",
        }
    }

    /// Case-insensitive tag lookup; `gemini` is accepted for Google
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            "google" | "gemini" => Some(Self::Google),
            "openrouter" => Some(Self::OpenRouter),
            _ => None,
        }
    }

    /// Vendor segment this provider's models carry in OpenRouter naming.
    /// OpenRouter itself is a router, not a vendor.
    pub fn vendor_slug(&self) -> Option<&'static str> {
        match self {
            Self::OpenRouter => None,
            other => Some(other.tag()),
        }
    }

    /// OpenAI-compatible endpoint of the provider
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Google => "https://generativelanguage.googleapis.com/v1beta/openai",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A model name bound to the provider that serves it.
///
/// ```rust
/// use ai_helper::{ModelIdentifier, Provider};
///
/// let id = ModelIdentifier::parse("gemini:gemini-2.0-flash").unwrap();
/// assert_eq!(id.provider(), Provider::Google);
/// assert_eq!(id.to_string(), "google:gemini-2.0-flash");
///
/// let routed = ModelIdentifier::parse("anthropic/claude-3.5-sonnet").unwrap();
/// assert_eq!(routed.provider(), Provider::OpenRouter);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelIdentifier {
    provider: Provider,
    model: String,
}

impl ModelIdentifier {
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Parse `provider:model`, or an untagged `vendor/model` served by OpenRouter.
    ///
    /// A `:` after a `/` belongs to the model name (`meta-llama/llama-3-8b:free`).
    ///
    /// # Errors
    ///
    /// - [`LlmError::UnsupportedProvider`] for an unknown provider tag
    /// - [`LlmError::ConfigurationError`] for an empty identifier or model, or a
    ///   bare name without tag or vendor path
    pub fn parse(raw: &str) -> LlmResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(LlmError::configuration_error(
                "Model identifier must not be empty",
            ));
        }

        if let Some((tag, model)) = raw.split_once(':') {
            if !tag.contains('/') {
                let model = model.trim();
                if tag.trim().is_empty() || model.is_empty() {
                    return Err(LlmError::configuration_error(format!(
                        "Model identifier '{raw}' must have the form provider:model"
                    )));
                }
                let provider =
                    Provider::from_tag(tag).ok_or_else(|| LlmError::unsupported_provider(tag))?;
                return Ok(Self::new(provider, model));
            }
        }

        match raw.split_once('/') {
            Some((vendor, name)) if !vendor.is_empty() && !name.is_empty() => {
                Ok(Self::new(Provider::OpenRouter, raw))
            }
            _ => Err(LlmError::configuration_error(format!(
                "Model identifier '{raw}' needs a provider tag (e.g. openai:{raw})"
            ))),
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Model name as sent to the provider
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model name without any `vendor/` path
    pub fn bare_model(&self) -> &str {
        self.model
            .rsplit_once('/')
            .map_or(self.model.as_str(), |(_, name)| name)
    }

    /// Whether the model name carries a `vendor/` path
    pub fn has_vendor_path(&self) -> bool {
        self.model.contains('/')
    }
}

impl fmt::Display for ModelIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.model)
    }
}

impl FromStr for ModelIdentifier {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
