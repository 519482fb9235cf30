//! Usage tracking
//!
//! The orchestrator reports cost, tool-call and fill-percentage events to an
//! injected [`UsageStore`]. Two stores ship with the crate: an in-memory one and
//! a JSON file one, both aggregating into a [`UsageLedger`].

mod file;
mod ledger;
mod memory;
mod store;

pub use file::JsonFileUsageStore;
pub use ledger::{
    DailyToolUsage, DailyUsage, FillSample, FillStats, UsageLedger, UsageSummary, UsageTotals,
};
pub use memory::InMemoryUsageStore;
pub use store::{CostRecord, UsageStore};

#[cfg(test)]
pub use store::MockUsageStore;
