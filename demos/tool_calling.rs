//! Tool calling example: the model answers with help from registered tools.
//!
//! This example shows how to:
//! - Build an adapter from a `provider:model` identifier
//! - Register the built-in calculator and a custom tool
//! - Let the model call tools over several turns
//! - Track cost against the OpenRouter pricing table
//!
//! # Running
//!
//! ```bash
//! export OPENAI_API_KEY="sk-..."
//! RUST_LOG=ai_helper=debug cargo run --example tool_calling
//! ```

use ai_helper::{
    AdapterFactory, AiHelper, AskRequest, CostModel, HelperConfig, InMemoryUsageStore,
    OpenRouterPricingSource, ProvidersConfig, ToolSignature,
};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let model_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openai:gpt-4o-mini".to_string());

    let config = HelperConfig::from_env()?;
    let factory = AdapterFactory::from_config(&ProvidersConfig::from_env()?);
    let pricing = OpenRouterPricingSource::from_config(&config.pricing);
    let costs = Arc::new(CostModel::new(Arc::new(pricing), &config.pricing));
    let usage = Arc::new(InMemoryUsageStore::new());

    let mut helper = AiHelper::from_model_id(&model_id, &factory)?
        .with_config(config)
        .with_cost_model(costs)
        .with_usage_store(usage.clone());

    helper.tools_mut().register_calculator();
    helper.register_tool(
        "unit_price",
        "Look up the unit price in EUR of a product in the shop catalogue",
        ToolSignature::new()
            .param::<String>("product")
            .describe("product", "Product name, e.g. 'notebook'"),
        |args| {
            let price = match args.string("product")? {
                "notebook" => 3.5,
                "pen" => 1.2,
                "stapler" => 8.0,
                other => anyhow::bail!("no product named '{other}'"),
            };
            Ok(json!(price))
        },
    );

    println!("Asking {model_id}...");
    let response = helper
        .ask(
            AskRequest::new("What do 12 notebooks and 30 pens cost in total? Use the tools.")
                .with_tools(["unit_price", "calculator"]),
        )
        .await?;

    println!("\nAnswer: {}", response.output.text().unwrap_or_default());
    println!("Tool rounds: {}", response.tool_rounds);
    println!(
        "Tokens: {} prompt / {} completion",
        response.usage.prompt_tokens, response.usage.completion_tokens
    );
    match response.cost {
        Some(cost) => println!("Cost: ${cost:.6}"),
        None => println!("Cost: unknown (model not in pricing table)"),
    }

    let summary = usage.summary(chrono::Utc::now());
    for (tool, calls) in &summary.tool_calls {
        println!("  {tool}: {calls} call(s)");
    }

    Ok(())
}
