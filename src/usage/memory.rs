use crate::error::LlmResult;
use crate::usage::ledger::{UsageLedger, UsageSummary};
use crate::usage::store::{CostRecord, UsageStore};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Process-local [`UsageStore`]
#[derive(Debug, Default)]
pub struct InMemoryUsageStore {
    ledger: Mutex<UsageLedger>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far
    pub fn ledger(&self) -> UsageLedger {
        self.lock().clone()
    }

    pub fn summary(&self, now: DateTime<Utc>) -> UsageSummary {
        self.lock().summary(now)
    }

    // A panic mid-update leaves a ledger that is still structurally valid
    fn lock(&self) -> MutexGuard<'_, UsageLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn record_cost(&self, record: &CostRecord) -> LlmResult<()> {
        self.lock().record_cost(record);
        Ok(())
    }

    async fn record_tool_call(&self, tool_name: &str) -> LlmResult<()> {
        self.lock().record_tool_call(tool_name, Utc::now());
        Ok(())
    }

    async fn record_fill_percentage(
        &self,
        schema_name: &str,
        model_id: &str,
        fill_percentage: f64,
    ) -> LlmResult<()> {
        self.lock()
            .record_fill_percentage(schema_name, model_id, fill_percentage, Utc::now());
        Ok(())
    }
}
