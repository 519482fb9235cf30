//! Cost accounting
//!
//! - `table` - per-token prices and the timestamped table snapshot
//! - `source` - the `PricingSource` contract and a static implementation
//! - `openrouter` - remote pricing from an OpenRouter-style models listing
//! - `cache` - the table persisted as JSON between runs
//! - `cost_model` - key normalisation, TTL refresh with retry cooldown, cost calculation
//!
//! ```rust
//! use ai_helper::{CostModel, PricingConfig, PricingEntry, StaticPricingSource};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let source = StaticPricingSource::new([PricingEntry::new("openai/gpt-4o", 2.5e-6, 1.0e-5)]);
//! let costs = CostModel::new(Arc::new(source), &PricingConfig::default());
//!
//! let estimate = costs.calculate("openai:gpt-4o", 1_000, 500).await;
//! assert!(estimate.cost().is_some());
//! # }
//! ```

mod cache;
mod cost_model;
mod openrouter;
mod source;
mod table;

pub use cache::PricingCacheFile;
pub use cost_model::{CostEstimate, CostModel};
pub use openrouter::OpenRouterPricingSource;
pub use source::{PricingSource, StaticPricingSource};
pub use table::{PricingEntry, PricingTable};

#[cfg(test)]
pub(crate) use cost_model::candidate_keys;
#[cfg(test)]
pub use source::MockPricingSource;
