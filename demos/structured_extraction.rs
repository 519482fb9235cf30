//! Structured extraction example: typed records from free-form answers.
//!
//! This example shows how to:
//! - Describe a target record with `SchemaDescriptor`
//! - Attach a file to the first turn
//! - Read the extracted instance and its fill percentage
//! - Persist usage to a JSON file and print the usage report
//!
//! # Running
//!
//! ```bash
//! export OPENROUTER_API_KEY="sk-or-..."
//! cargo run --example structured_extraction -- path/to/invoice.pdf
//! ```

use ai_helper::{
    AdapterFactory, AiHelper, AskRequest, CostModel, FieldDescriptor, FieldKind, FileAttachment,
    HelperConfig, JsonFileUsageStore, OpenRouterPricingSource, ProvidersConfig, SchemaDescriptor,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Deserialize)]
struct Invoice {
    vendor: String,
    invoice_number: String,
    total: f64,
    currency: String,
    line_items: Vec<String>,
    paid: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = HelperConfig::from_env()?;
    let factory = AdapterFactory::from_config(&ProvidersConfig::from_env()?);
    let pricing = OpenRouterPricingSource::from_config(&config.pricing);
    let costs = Arc::new(CostModel::new(Arc::new(pricing), &config.pricing));
    let usage = Arc::new(JsonFileUsageStore::open("usage/usage.json").await);

    let helper = AiHelper::from_model_id("openrouter:openai/gpt-4o-mini", &factory)?
        .with_config(config)
        .with_cost_model(costs)
        .with_usage_store(usage.clone());

    let request = match std::env::args().nth(1) {
        Some(path) => AskRequest::new("Extract the invoice details as JSON.")
            .with_file(FileAttachment::from_path(&path).await?),
        None => AskRequest::new(
            "Extract the invoice details as JSON from this text: \
             ACME GmbH, invoice INV-2041, 3x widgets, 1x shipping, total 129.90 EUR, status: paid.",
        ),
    }
    .with_schema(invoice_schema());

    let response = helper.ask(request).await?;

    let Some(extracted) = response.output.structured() else {
        anyhow::bail!("expected a structured answer");
    };
    println!("Fill: {:.0}%", extracted.fill_percentage);
    println!("Populated: {}", extracted.populated_fields().join(", "));

    let invoice: Invoice = extracted.deserialize()?;
    println!(
        "{} #{}: {:.2} {} ({} line items, {})",
        invoice.vendor,
        invoice.invoice_number,
        invoice.total,
        invoice.currency,
        invoice.line_items.len(),
        if invoice.paid { "paid" } else { "open" }
    );

    let summary = usage.summary(chrono::Utc::now()).await;
    println!("\n{summary}");

    Ok(())
}

fn invoice_schema() -> SchemaDescriptor {
    SchemaDescriptor::new("invoice")
        .required("vendor", FieldKind::String)
        .required("invoice_number", FieldKind::String)
        .required("total", FieldKind::Number)
        .field(FieldDescriptor::required("currency", FieldKind::String).with_default("EUR".into()))
        .optional("line_items", FieldKind::array_of(FieldKind::String))
        .field(
            FieldDescriptor::optional("paid", FieldKind::Boolean)
                .with_description("Whether the invoice is marked as paid"),
        )
}
