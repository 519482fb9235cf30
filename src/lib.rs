//! # ai-helper
//!
//! Provider-agnostic LLM request orchestration with tool calling, lenient
//! structured extraction and token-based cost accounting.
//!
//! ## Key Features
//!
//! - **One contract, many providers**: `provider:model` identifiers dispatch to an
//!   [`Adapter`] built by the [`AdapterFactory`]
//! - **Tool calling loop**: multi-turn, sequential, bounded by an iteration cap
//! - **Structured extraction**: salvages typed records from malformed output and
//!   reports a fill percentage instead of failing
//! - **Cost accounting**: cached remote pricing table with TTL refresh, cost events
//!   reported to a pluggable [`UsageStore`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use ai_helper::{
//!     AdapterFactory, AiHelper, AskRequest, CostModel, FieldKind, HelperConfig,
//!     InMemoryUsageStore, OpenRouterPricingSource, ProvidersConfig, SchemaDescriptor,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> ai_helper::LlmResult<()> {
//! let config = HelperConfig::from_env()?;
//! let factory = AdapterFactory::from_config(&ProvidersConfig::from_env()?);
//! let pricing = OpenRouterPricingSource::from_config(&config.pricing);
//! let costs = Arc::new(CostModel::new(Arc::new(pricing), &config.pricing));
//!
//! let helper = AiHelper::from_model_id("openrouter:openai/gpt-4o-mini", &factory)?
//!     .with_config(config)
//!     .with_cost_model(costs)
//!     .with_usage_store(Arc::new(InMemoryUsageStore::new()));
//!
//! let schema = SchemaDescriptor::new("city")
//!     .required("name", FieldKind::String)
//!     .required("population", FieldKind::Integer);
//! let response = helper
//!     .ask(AskRequest::new("Describe the largest city in Japan as JSON").with_schema(schema))
//!     .await?;
//!
//! if let Some(city) = response.output.structured() {
//!     println!("{:?} ({}% filled)", city.instance, city.fill_percentage);
//! }
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod config;
pub mod core_types;
pub mod error;
pub mod extraction;
pub mod helper;
pub(crate) mod internals;
pub mod pricing;
pub mod providers;
pub mod tools;
pub mod usage;

#[cfg(test)]
pub mod tests;

pub use config::{HelperConfig, PricingConfig, ProviderSettings, ProvidersConfig};
pub use error::{ErrorCategory, ErrorSeverity, LlmError, LlmResult};
pub use helper::{AiHelper, AskOutput, AskRequest, AskResponse};
pub use internals::retry::RetryPolicy;

pub use core_types::{
    Adapter, AdapterRequest, AdapterResponse, Conversation, FileAttachment, Message, MessageRole,
    TokenUsage, ToolCallRequest, ToolSchema,
};
pub use extraction::{
    ExtractionResult, FieldDescriptor, FieldKind, SchemaDescriptor, StructuredExtractor,
};
pub use pricing::{
    CostEstimate, CostModel, OpenRouterPricingSource, PricingCacheFile, PricingEntry, PricingSource,
    PricingTable, StaticPricingSource,
};
pub use providers::{AdapterFactory, ModelIdentifier, OpenAiCompatibleAdapter, Provider};
pub use tools::{
    ParamType, ParameterKind, ToolArguments, ToolOutput, ToolParameter, ToolRegistry, ToolSignature,
};
pub use usage::{
    CostRecord, InMemoryUsageStore, JsonFileUsageStore, UsageLedger, UsageStore, UsageSummary,
    UsageTotals,
};
