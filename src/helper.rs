//! The orchestrator: conversation loop, tool execution, extraction and cost events
//!
//! ```text
//! ask ─▶ AwaitModel ─▶ no tool calls ─────────────────────────▶ Finalize ─▶ Done
//!            ▲              │
//!            │         tool calls
//!            │              ▼
//!            └──── ExecuteTools (in model order, round += 1, stop at cap)
//! ```

use crate::config::HelperConfig;
use crate::core_types::{
    Adapter, AdapterRequest, Conversation, FileAttachment, Message, TokenUsage, ToolCallRequest,
};
use crate::error::LlmResult;
use crate::extraction::{ExtractionResult, SchemaDescriptor, StructuredExtractor};
use crate::logging::{ask_span, log_debug, log_info, log_warn};
use crate::pricing::CostModel;
use crate::providers::{AdapterFactory, ModelIdentifier};
use crate::tools::{ToolArguments, ToolRegistry, ToolSignature};
use crate::usage::{CostRecord, UsageStore};

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

/// One question to the model
#[derive(Debug, Clone)]
pub struct AskRequest {
    prompt: String,
    tools: Vec<String>,
    schema: Option<SchemaDescriptor>,
    file: Option<FileAttachment>,
}

impl AskRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tools: Vec::new(),
            schema: None,
            file: None,
        }
    }

    /// Registered tools the model may call during this request
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools.extend(tools.into_iter().map(Into::into));
        self
    }

    /// Extract the final answer into `schema`
    pub fn with_schema(mut self, schema: SchemaDescriptor) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Send `file` along with the first model turn
    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }
}

/// Final answer of an `ask`
#[derive(Debug, Clone, PartialEq)]
pub enum AskOutput {
    /// Last assistant text, verbatim (possibly empty)
    Text(String),
    Structured(ExtractionResult),
}

impl AskOutput {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    pub fn structured(&self) -> Option<&ExtractionResult> {
        match self {
            Self::Structured(result) => Some(result),
            Self::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AskResponse {
    pub output: AskOutput,
    /// Full message log of this request
    pub conversation: Conversation,
    /// Tool execution rounds performed
    pub tool_rounds: usize,
    /// Token usage summed over every adapter call
    pub usage: TokenUsage,
    /// Summed cost of the priced adapter calls; `None` when none could be priced
    pub cost: Option<f64>,
}

/// Drives one model through multi-turn tool calling and structured extraction.
///
/// ```rust,no_run
/// use ai_helper::{AdapterFactory, AiHelper, AskRequest, ProvidersConfig};
///
/// # async fn example() -> ai_helper::LlmResult<()> {
/// let factory = AdapterFactory::from_config(&ProvidersConfig::from_env()?);
/// let mut helper = AiHelper::from_model_id("openai:gpt-4o-mini", &factory)?;
/// helper.tools_mut().register_calculator();
///
/// let response = helper
///     .ask(AskRequest::new("What is 17 * 23?").with_tools(["calculator"]))
///     .await?;
/// println!("{}", response.output.text().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub struct AiHelper {
    model: ModelIdentifier,
    adapter: Arc<dyn Adapter>,
    tools: ToolRegistry,
    config: HelperConfig,
    cost_model: Option<Arc<CostModel>>,
    usage_store: Option<Arc<dyn UsageStore>>,
}

impl std::fmt::Debug for AiHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiHelper")
            .field("model", &self.model)
            .field("adapter", &self.adapter.provider_name())
            .field("tools", &self.tools)
            .field("config", &self.config)
            .field("has_cost_model", &self.cost_model.is_some())
            .field("has_usage_store", &self.usage_store.is_some())
            .finish()
    }
}

impl AiHelper {
    pub fn new(model: ModelIdentifier, adapter: Arc<dyn Adapter>) -> Self {
        Self {
            model,
            adapter,
            tools: ToolRegistry::new(),
            config: HelperConfig::default(),
            cost_model: None,
            usage_store: None,
        }
    }

    /// Parse `model_id` and build its adapter through `factory`
    ///
    /// # Errors
    ///
    /// Malformed identifiers, unknown providers and adapter construction failures.
    pub fn from_model_id(model_id: &str, factory: &AdapterFactory) -> LlmResult<Self> {
        let model = ModelIdentifier::parse(model_id)?;
        let adapter = factory.create(&model)?;
        Ok(Self::new(model, adapter))
    }

    pub fn with_config(mut self, config: HelperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cost_model(mut self, cost_model: Arc<CostModel>) -> Self {
        self.cost_model = Some(cost_model);
        self
    }

    pub fn with_usage_store(mut self, usage_store: Arc<dyn UsageStore>) -> Self {
        self.usage_store = Some(usage_store);
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    /// Register a tool on this helper's registry
    pub fn register_tool<F>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        signature: ToolSignature,
        callable: F,
    ) -> &mut Self
    where
        F: Fn(&ToolArguments) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.tools.register(name, description, signature, callable);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut ToolRegistry {
        &mut self.tools
    }

    pub fn model(&self) -> &ModelIdentifier {
        &self.model
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    /// Run the conversation loop for `request`.
    ///
    /// # Errors
    ///
    /// Only caller-side configuration mistakes, all detected before the first
    /// model call: an unregistered tool name, an invalid schema, or an invalid
    /// [`HelperConfig`]. Provider, tool, extraction, pricing and storage failures
    /// degrade into the response instead.
    pub async fn ask(&self, request: AskRequest) -> LlmResult<AskResponse> {
        let request_id = Uuid::new_v4();
        let model_id = self.model.to_string();
        let span = ask_span(&request_id, &model_id);
        self.run(request, &model_id).instrument(span).await
    }

    async fn run(&self, request: AskRequest, model_id: &str) -> LlmResult<AskResponse> {
        self.config.validate()?;
        let tool_schemas = self.tools.schemas_for(request.tools.as_slice())?;
        if let Some(schema) = &request.schema {
            schema.validate()?;
        }

        let AskRequest {
            prompt,
            tools,
            schema,
            mut file,
        } = request;
        let allowed: HashSet<&str> = tools.iter().map(String::as_str).collect();

        let mut conversation = Conversation::from_prompt(prompt);
        let mut usage = TokenUsage::default();
        let mut cost: Option<f64> = None;
        let mut tool_rounds = 0usize;

        loop {
            log_debug!(
                round = tool_rounds,
                messages = conversation.len(),
                "Awaiting model turn"
            );

            let response = self
                .adapter
                .process(AdapterRequest {
                    messages: conversation.clone(),
                    tool_schemas: tool_schemas.clone(),
                    schema: schema.clone(),
                    file: file.take(),
                })
                .await;

            if let Some(turn_usage) = response.usage {
                usage.accumulate(turn_usage);
                let schema_name = schema.as_ref().map(SchemaDescriptor::name);
                let turn_cost = self.record_usage(model_id, turn_usage, schema_name).await;
                if let Some(turn_cost) = turn_cost {
                    *cost.get_or_insert(0.0) += turn_cost;
                }
            }

            let tool_calls = response.tool_calls;
            conversation.push(Message::assistant(response.text, tool_calls.clone()));
            if tool_calls.is_empty() {
                break;
            }

            for call in &tool_calls {
                let content = self.execute_tool(call, &allowed).await;
                conversation.push(Message::tool_result(call, content));
            }
            tool_rounds += 1;

            if tool_rounds >= self.config.max_tool_iterations {
                log_warn!(
                    max_tool_iterations = self.config.max_tool_iterations,
                    "Tool iteration cap reached, finalizing with last assistant text"
                );
                break;
            }
        }

        let text = conversation.last_assistant_text().to_string();
        let output = match &schema {
            Some(schema) => {
                let result = StructuredExtractor::parse(&text, schema);
                self.record_fill(schema.name(), model_id, result.fill_percentage)
                    .await;
                AskOutput::Structured(result)
            }
            None => AskOutput::Text(text),
        };

        log_info!(
            tool_rounds = tool_rounds,
            messages = conversation.len(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            cost = cost.unwrap_or_default(),
            "Ask completed"
        );

        Ok(AskResponse {
            output,
            conversation,
            tool_rounds,
            usage,
            cost,
        })
    }

    /// Execute one tool call; anything outside this request's tool set gets error text
    async fn execute_tool(&self, call: &ToolCallRequest, allowed: &HashSet<&str>) -> String {
        if !allowed.contains(call.name.as_str()) {
            log_warn!(
                tool = %call.name,
                call_id = %call.id,
                "Model called a tool outside this request's tool set"
            );
            return format!(
                "Error: tool '{}' is not available for this request",
                call.name
            );
        }

        let output = self.tools.execute(&call.name, &call.raw_arguments);
        log_debug!(
            tool = %call.name,
            call_id = %call.id,
            is_error = output.is_error,
            "Tool call finished"
        );

        if let Some(store) = &self.usage_store {
            if let Err(e) = store.record_tool_call(&call.name).await {
                log_warn!(error = %e, tool = %call.name, "Failed to record tool call");
            }
        }

        output.content
    }

    /// Price one adapter call and report it; returns the cost when known
    async fn record_usage(
        &self,
        model_id: &str,
        usage: TokenUsage,
        schema_name: Option<&str>,
    ) -> Option<f64> {
        let cost = match &self.cost_model {
            Some(cost_model) => cost_model
                .calculate(model_id, usage.prompt_tokens, usage.completion_tokens)
                .await
                .cost(),
            None => None,
        };

        if let Some(store) = &self.usage_store {
            let mut record = CostRecord::new(
                model_id,
                usage.prompt_tokens,
                usage.completion_tokens,
                cost,
            )
            .with_provider(self.model.provider().tag());
            if let Some(schema_name) = schema_name {
                record = record.with_schema(schema_name);
            }
            if let Err(e) = store.record_cost(&record).await {
                log_warn!(error = %e, "Failed to record cost event");
            }
        }

        cost
    }

    async fn record_fill(&self, schema_name: &str, model_id: &str, fill_percentage: f64) {
        if let Some(store) = &self.usage_store {
            if let Err(e) = store
                .record_fill_percentage(schema_name, model_id, fill_percentage)
                .await
            {
                log_warn!(error = %e, "Failed to record fill percentage");
            }
        }
    }
}
