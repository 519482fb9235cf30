//! Aggregated usage records and the summaries derived from them

use crate::usage::store::CostRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Grouping key for records without a provider
const UNKNOWN_PROVIDER: &str = "unknown";

/// Token, request and cost totals for one model, provider and schema on one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    /// `YYYY-MM-DD`
    pub day: String,
    pub model_id: String,
    #[serde(default)]
    pub provider: String,
    /// Extraction schema of the calls, `None` for plain text answers
    #[serde(default)]
    pub schema_name: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub requests: u64,
    /// Requests whose cost was unknown
    #[serde(default)]
    pub unpriced_requests: u64,
    pub cost: f64,
}

impl DailyUsage {
    /// `YYYY-MM`
    pub fn month(&self) -> &str {
        self.day.get(..7).unwrap_or(&self.day)
    }
}

/// Tool invocations for one tool on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyToolUsage {
    pub day: String,
    pub tool_name: String,
    pub calls: u64,
}

/// One fill-percentage sample of a structured `ask`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillSample {
    pub schema_name: String,
    pub model_id: String,
    pub fill_percentage: f64,
    pub recorded_at: DateTime<Utc>,
}

/// Token, request and cost totals for one grouping key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub requests: u64,
    pub unpriced_requests: u64,
    pub cost: f64,
}

impl UsageTotals {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }

    fn add(&mut self, record: &DailyUsage) {
        self.input_tokens += record.input_tokens;
        self.output_tokens += record.output_tokens;
        self.requests += record.requests;
        self.unpriced_requests += record.unpriced_requests;
        self.cost += record.cost;
    }
}

/// Mean of a set of fill samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FillStats {
    pub average: f64,
    pub count: u64,
}

/// Report built from a [`UsageLedger`].
///
/// `Display` renders it as a plain-text report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_cost: f64,
    pub cost_today: f64,
    pub cost_this_month: f64,
    pub total_requests: u64,
    pub unpriced_requests: u64,
    pub total_tool_calls: u64,
    /// Keyed by `YYYY-MM`
    pub by_month: BTreeMap<String, UsageTotals>,
    pub by_model: BTreeMap<String, UsageTotals>,
    pub by_provider: BTreeMap<String, UsageTotals>,
    /// Calls made for structured extraction, keyed by schema name
    pub by_schema: BTreeMap<String, UsageTotals>,
    pub tool_calls: BTreeMap<String, u64>,
    /// Keyed by `YYYY-MM`
    pub tool_calls_by_month: BTreeMap<String, u64>,
    pub fill_by_schema: BTreeMap<String, FillStats>,
    pub fill_by_model: BTreeMap<String, FillStats>,
}

/// Usage history, merged per (day, model, provider, schema) and (day, tool).
///
/// Serialises to the JSON document written by
/// [`JsonFileUsageStore`](crate::usage::JsonFileUsageStore).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageLedger {
    #[serde(default)]
    pub usage_records: Vec<DailyUsage>,
    #[serde(default)]
    pub tool_usage_records: Vec<DailyToolUsage>,
    #[serde(default)]
    pub fill_percentage_records: Vec<FillSample>,
}

fn day_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

impl UsageLedger {
    pub fn record_cost(&mut self, record: &CostRecord) {
        let day = day_key(record.recorded_at);
        let index = match self.usage_records.iter().position(|r| {
            r.day == day
                && r.model_id == record.model_id
                && r.provider == record.provider
                && r.schema_name == record.schema_name
        }) {
            Some(index) => index,
            None => {
                self.usage_records.push(DailyUsage {
                    day,
                    model_id: record.model_id.clone(),
                    provider: record.provider.clone(),
                    schema_name: record.schema_name.clone(),
                    ..DailyUsage::default()
                });
                self.usage_records.len() - 1
            }
        };

        let entry = &mut self.usage_records[index];
        entry.input_tokens += u64::from(record.prompt_tokens);
        entry.output_tokens += u64::from(record.completion_tokens);
        entry.requests += 1;
        match record.cost {
            Some(cost) => entry.cost += cost,
            None => entry.unpriced_requests += 1,
        }
    }

    pub fn record_tool_call(&mut self, tool_name: &str, at: DateTime<Utc>) {
        let day = day_key(at);
        match self
            .tool_usage_records
            .iter_mut()
            .find(|r| r.day == day && r.tool_name == tool_name)
        {
            Some(existing) => existing.calls += 1,
            None => self.tool_usage_records.push(DailyToolUsage {
                day,
                tool_name: tool_name.to_string(),
                calls: 1,
            }),
        }
    }

    pub fn record_fill_percentage(
        &mut self,
        schema_name: &str,
        model_id: &str,
        fill_percentage: f64,
        at: DateTime<Utc>,
    ) {
        self.fill_percentage_records.push(FillSample {
            schema_name: schema_name.to_string(),
            model_id: model_id.to_string(),
            fill_percentage,
            recorded_at: at,
        });
    }

    /// Aggregate everything recorded so far; `now` decides "today" and "this month"
    pub fn summary(&self, now: DateTime<Utc>) -> UsageSummary {
        let today = day_key(now);
        let this_month = month_key(now);
        let mut summary = UsageSummary::default();

        for record in &self.usage_records {
            summary.total_cost += record.cost;
            summary.total_requests += record.requests;
            summary.unpriced_requests += record.unpriced_requests;
            if record.day == today {
                summary.cost_today += record.cost;
            }
            if record.month() == this_month {
                summary.cost_this_month += record.cost;
            }

            let provider = if record.provider.is_empty() {
                UNKNOWN_PROVIDER
            } else {
                record.provider.as_str()
            };
            summary
                .by_month
                .entry(record.month().to_string())
                .or_default()
                .add(record);
            summary
                .by_model
                .entry(record.model_id.clone())
                .or_default()
                .add(record);
            summary
                .by_provider
                .entry(provider.to_string())
                .or_default()
                .add(record);
            if let Some(schema_name) = &record.schema_name {
                summary
                    .by_schema
                    .entry(schema_name.clone())
                    .or_default()
                    .add(record);
            }
        }

        for record in &self.tool_usage_records {
            summary.total_tool_calls += record.calls;
            *summary
                .tool_calls
                .entry(record.tool_name.clone())
                .or_default() += record.calls;
            let month = record.day.get(..7).unwrap_or(&record.day);
            *summary
                .tool_calls_by_month
                .entry(month.to_string())
                .or_default() += record.calls;
        }

        for sample in &self.fill_percentage_records {
            add_sample(
                summary
                    .fill_by_schema
                    .entry(sample.schema_name.clone())
                    .or_default(),
                sample.fill_percentage,
            );
            add_sample(
                summary
                    .fill_by_model
                    .entry(sample.model_id.clone())
                    .or_default(),
                sample.fill_percentage,
            );
        }

        summary
    }
}

/// Running mean update
fn add_sample(stats: &mut FillStats, value: f64) {
    stats.count += 1;
    stats.average += (value - stats.average) / stats.count as f64;
}

fn write_totals(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    key_header: &str,
    rows: &BTreeMap<String, UsageTotals>,
) -> fmt::Result {
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(
        f,
        "  {:<40} {:>9} {:>12} {:>12} {:>12} {:>14}",
        key_header, "Requests", "Input", "Output", "Total", "Cost"
    )?;
    for (key, totals) in rows {
        writeln!(
            f,
            "  {:<40} {:>9} {:>12} {:>12} {:>12} {:>14}",
            key,
            totals.requests,
            totals.input_tokens,
            totals.output_tokens,
            totals.total_tokens(),
            format!("${:.6}", totals.cost)
        )?;
    }
    Ok(())
}

fn write_counts(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    key_header: &str,
    rows: &BTreeMap<String, u64>,
) -> fmt::Result {
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "  {:<40} {:>9}", key_header, "Calls")?;
    for (key, calls) in rows {
        writeln!(f, "  {key:<40} {calls:>9}")?;
    }
    Ok(())
}

fn write_fill(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    key_header: &str,
    rows: &BTreeMap<String, FillStats>,
) -> fmt::Result {
    if rows.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(
        f,
        "  {:<40} {:>10} {:>9}",
        key_header, "Avg Fill", "Samples"
    )?;
    for (key, stats) in rows {
        writeln!(
            f,
            "  {:<40} {:>10} {:>9}",
            key,
            format!("{:.2}%", stats.average),
            stats.count
        )?;
    }
    Ok(())
}

impl fmt::Display for UsageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "USAGE SUMMARY")?;
        writeln!(f, "  Today:       ${:.6}", self.cost_today)?;
        writeln!(f, "  This month:  ${:.6}", self.cost_this_month)?;
        writeln!(
            f,
            "  All time:    ${:.6} over {} requests ({} unpriced), {} tool calls",
            self.total_cost, self.total_requests, self.unpriced_requests, self.total_tool_calls
        )?;

        write_totals(f, "LLM USAGE BY MONTH", "Month", &self.by_month)?;
        write_totals(f, "LLM USAGE BY MODEL", "Model", &self.by_model)?;
        write_totals(f, "LLM USAGE BY PROVIDER", "Provider", &self.by_provider)?;
        write_totals(f, "LLM USAGE BY SCHEMA", "Schema", &self.by_schema)?;
        write_counts(f, "TOOL CALLS BY MONTH", "Month", &self.tool_calls_by_month)?;
        write_counts(f, "TOOL CALLS BY NAME", "Tool", &self.tool_calls)?;
        write_fill(
            f,
            "FILL PERCENTAGE BY SCHEMA",
            "Schema",
            &self.fill_by_schema,
        )?;
        write_fill(f, "FILL PERCENTAGE BY MODEL", "Model", &self.fill_by_model)
    }
}
