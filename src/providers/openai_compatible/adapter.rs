use super::conversion::{build_chat_request, convert_response};
use super::types::{ChatRequest, ChatResponse};
use crate::config::ProviderSettings;
use crate::core_types::{Adapter, AdapterRequest, AdapterResponse};
use crate::error::{LlmError, LlmResult};
use crate::internals::http::{build_headers, read_json, transport_error};
use crate::internals::retry::RetryExecutor;
use crate::logging::{log_debug, log_warn};
use crate::providers::model_id::ModelIdentifier;

use reqwest::header::HeaderMap;
use std::time::Instant;

/// Adapter for any provider exposing an OpenAI-style `/chat/completions` endpoint
#[derive(Debug)]
pub struct OpenAiCompatibleAdapter {
    client: reqwest::Client,
    retry_executor: RetryExecutor,
    headers: HeaderMap,
    endpoint: String,
    model: ModelIdentifier,
}

impl OpenAiCompatibleAdapter {
    /// Create an adapter for `model` using `settings`
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] if the API key is missing or not a
    /// valid header value, or the base URL is invalid.
    pub fn new(model: ModelIdentifier, settings: ProviderSettings) -> LlmResult<Self> {
        settings.validate()?;
        let api_key = settings.api_key.as_deref().ok_or_else(|| {
            LlmError::configuration_error(format!(
                "API key for provider '{}' is required",
                model.provider()
            ))
        })?;

        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.trim_end_matches('/')
        );
        log_debug!(
            provider = %model.provider(),
            model = model.model(),
            endpoint = %endpoint,
            max_attempts = settings.retry_policy.max_attempts,
            "Creating OpenAI-compatible adapter"
        );

        Ok(Self {
            client: reqwest::Client::new(),
            retry_executor: RetryExecutor::new(settings.retry_policy.clone()),
            headers: build_headers(Some(api_key))?,
            endpoint,
            model,
        })
    }

    pub fn model(&self) -> &ModelIdentifier {
        &self.model
    }

    async fn send(&self, request: &ChatRequest) -> LlmResult<ChatResponse> {
        self.retry_executor
            .execute(|| self.send_once(request))
            .await
    }

    async fn send_once(&self, request: &ChatRequest) -> LlmResult<ChatResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(&self.endpoint, e))?;
        read_json::<ChatResponse>(response).await
    }
}

#[async_trait::async_trait]
impl Adapter for OpenAiCompatibleAdapter {
    async fn process(&self, request: AdapterRequest) -> AdapterResponse {
        let chat_request = build_chat_request(self.model.model(), &request);
        let start_time = Instant::now();

        match self.send(&chat_request).await {
            Ok(chat_response) => {
                let response = convert_response(chat_response);
                log_debug!(
                    provider = self.provider_name(),
                    duration_ms = start_time.elapsed().as_millis() as u64,
                    tool_calls = response.tool_calls.len(),
                    has_usage = response.usage.is_some(),
                    "Chat completion received"
                );
                response
            }
            Err(e) => {
                log_warn!(
                    provider = self.provider_name(),
                    error = %e,
                    "Chat completion failed, returning error text"
                );
                AdapterResponse::from_error(&e)
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        self.model.provider().tag()
    }
}
