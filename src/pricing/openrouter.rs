//! Pricing fetched from an OpenRouter-style models listing
//!
//! `GET {url}` returns `{"data": [{"id": "...", "pricing": {"prompt": "...", "completion": "..."}}]}`
//! with per-token USD prices encoded as strings or numbers.

use crate::config::PricingConfig;
use crate::error::{LlmError, LlmResult};
use crate::internals::http::{build_headers, read_json, transport_error};
use crate::internals::retry::{RetryExecutor, RetryPolicy};
use crate::logging::{log_debug, log_info};
use crate::pricing::source::PricingSource;
use crate::pricing::table::PricingEntry;

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Option<Vec<ModelListing>>,
}

#[derive(Debug, Deserialize)]
struct ModelListing {
    id: String,
    #[serde(default)]
    pricing: Option<ListingPricing>,
}

#[derive(Debug, Deserialize)]
struct ListingPricing {
    #[serde(default)]
    prompt: Option<Value>,
    #[serde(default)]
    completion: Option<Value>,
}

/// [`PricingSource`] backed by the OpenRouter models endpoint
#[derive(Debug)]
pub struct OpenRouterPricingSource {
    client: reqwest::Client,
    retry_executor: RetryExecutor,
    url: String,
    api_key: Option<String>,
}

impl OpenRouterPricingSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            retry_executor: RetryExecutor::new(RetryPolicy::default()),
            url: url.into(),
            api_key: None,
        }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.source_url.clone())
    }

    /// The listing is public; a key is only sent when one is configured
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_executor = RetryExecutor::new(policy);
        self
    }

    async fn fetch_once(&self) -> LlmResult<ModelsResponse> {
        let response = self
            .client
            .get(&self.url)
            .headers(build_headers(self.api_key.as_deref())?)
            .send()
            .await
            .map_err(|e| transport_error(&self.url, e))?;
        read_json::<ModelsResponse>(response).await
    }
}

#[async_trait::async_trait]
impl PricingSource for OpenRouterPricingSource {
    async fn fetch(&self) -> LlmResult<HashMap<String, PricingEntry>> {
        let listing = self.retry_executor.execute(|| self.fetch_once()).await?;
        let models = listing.data.ok_or_else(|| {
            LlmError::response_parsing_error("Models listing has no 'data' array")
        })?;

        let total = models.len();
        let entries: HashMap<String, PricingEntry> = models
            .into_iter()
            .filter_map(|model| {
                let pricing = model.pricing?;
                let input = parse_price(pricing.prompt.as_ref())?;
                let output = parse_price(pricing.completion.as_ref())?;
                Some((model.id.clone(), PricingEntry::new(model.id, input, output)))
            })
            .collect();

        log_debug!(
            listed = total,
            skipped = total - entries.len(),
            "Parsed models listing"
        );
        log_info!(url = %self.url, models = entries.len(), "Fetched pricing table");

        Ok(entries)
    }
}

/// Per-token price from a string or number; negative and non-finite values are rejected
fn parse_price(value: Option<&Value>) -> Option<f64> {
    let price = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (price.is_finite() && price >= 0.0).then_some(price)
}
