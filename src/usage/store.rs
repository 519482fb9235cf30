use crate::error::LlmResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cost event emitted for every adapter call that reported token usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    /// Canonical `provider:model` identifier
    pub model_id: String,
    /// Tag of the provider that served the call; empty when not known
    #[serde(default)]
    pub provider: String,
    /// Extraction schema the call was answering, if any
    #[serde(default)]
    pub schema_name: Option<String>,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    /// `None` when no pricing entry matched; excluded from cost totals
    pub cost: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

impl CostRecord {
    pub fn new(
        model_id: impl Into<String>,
        prompt_tokens: u32,
        completion_tokens: u32,
        cost: Option<f64>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            provider: String::new(),
            schema_name: None,
            prompt_tokens,
            completion_tokens,
            cost,
            recorded_at: Utc::now(),
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = Some(schema_name.into());
        self
    }

    pub fn at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}

/// Sink for usage events.
///
/// Failures are reported to the caller of the store, but the orchestrator only
/// logs them; recording never changes the outcome of an `ask`.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UsageStore: Send + Sync {
    async fn record_cost(&self, record: &CostRecord) -> LlmResult<()>;

    async fn record_tool_call(&self, _tool_name: &str) -> LlmResult<()> {
        Ok(())
    }

    async fn record_fill_percentage(
        &self,
        _schema_name: &str,
        _model_id: &str,
        _fill_percentage: f64,
    ) -> LlmResult<()> {
        Ok(())
    }
}
