use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Per-token prices of one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    pub model_id: String,
    pub input_price_per_token: f64,
    pub output_price_per_token: f64,
}

impl PricingEntry {
    pub fn new(
        model_id: impl Into<String>,
        input_price_per_token: f64,
        output_price_per_token: f64,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            input_price_per_token,
            output_price_per_token,
        }
    }

    /// Cost of one call; linear in both token counts
    pub fn cost(&self, prompt_tokens: u32, completion_tokens: u32) -> f64 {
        f64::from(prompt_tokens) * self.input_price_per_token
            + f64::from(completion_tokens) * self.output_price_per_token
    }
}

/// Snapshot of the remote pricing table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    entries: HashMap<String, PricingEntry>,
    last_refreshed: DateTime<Utc>,
}

impl PricingTable {
    pub fn new(entries: HashMap<String, PricingEntry>, last_refreshed: DateTime<Utc>) -> Self {
        Self {
            entries,
            last_refreshed,
        }
    }

    pub fn get(&self, model_id: &str) -> Option<&PricingEntry> {
        self.entries.get(model_id)
    }

    /// Lexicographically first key whose last `/` segment is `name`
    pub fn find_by_suffix(&self, name: &str) -> Option<(&str, &PricingEntry)> {
        self.entries
            .iter()
            .filter(|(key, _)| key.rsplit('/').next() == Some(name))
            .min_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(key, entry)| (key.as_str(), entry))
    }

    pub fn last_refreshed(&self) -> DateTime<Utc> {
        self.last_refreshed
    }

    /// Valid while `now - last_refreshed < ttl`
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now.signed_duration_since(self.last_refreshed) < ttl,
            Err(_) => true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
