use crate::error::LlmResult;
use crate::pricing::table::PricingEntry;
use std::collections::HashMap;

/// Where pricing tables come from.
///
/// Results are treated as best-effort; a failed fetch never reaches `ask` callers.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PricingSource: Send + Sync {
    /// Fetch the full table, keyed by model id
    async fn fetch(&self) -> LlmResult<HashMap<String, PricingEntry>>;
}

/// Fixed pricing table for offline use
#[derive(Debug, Clone, Default)]
pub struct StaticPricingSource {
    entries: HashMap<String, PricingEntry>,
}

impl StaticPricingSource {
    pub fn new(entries: impl IntoIterator<Item = PricingEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|entry| (entry.model_id.clone(), entry))
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl PricingSource for StaticPricingSource {
    async fn fetch(&self) -> LlmResult<HashMap<String, PricingEntry>> {
        Ok(self.entries.clone())
    }
}
