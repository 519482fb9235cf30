use crate::config::PricingConfig;
use crate::error::{LlmError, LlmResult};
use crate::logging::{log_debug, log_info, log_warn};
use crate::pricing::cache::PricingCacheFile;
use crate::pricing::source::PricingSource;
use crate::pricing::table::{PricingEntry, PricingTable};
use crate::providers::Provider;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Outcome of a cost calculation
#[derive(Debug, Clone, PartialEq)]
pub enum CostEstimate {
    Priced {
        cost: f64,
        /// Table key (or default entry id) the price came from
        pricing_key: String,
    },
    /// No entry and no default; the event is not accumulated
    Unknown,
}

impl CostEstimate {
    pub fn cost(&self) -> Option<f64> {
        match self {
            Self::Priced { cost, .. } => Some(*cost),
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Pricing table in memory plus what is known about the last refresh attempt
#[derive(Debug, Default)]
struct PricingState {
    table: Option<PricingTable>,
    /// Last failed refresh; no new attempt is made within the retry cooldown
    failed_at: Option<DateTime<Utc>>,
    cache_checked: bool,
}

/// Token-based cost calculation over a lazily refreshed pricing table.
///
/// The table is fetched on first use and again once it is older than the TTL.
/// A failed refresh keeps the previous table; the next attempt waits for the
/// retry cooldown. With a cache file configured, the table is read from it
/// before the first fetch and written to it after every successful one.
pub struct CostModel {
    source: Arc<dyn PricingSource>,
    ttl: Duration,
    retry_cooldown: Duration,
    default_entry: Option<PricingEntry>,
    cache: Option<PricingCacheFile>,
    state: Mutex<PricingState>,
}

impl std::fmt::Debug for CostModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostModel")
            .field("ttl", &self.ttl)
            .field("retry_cooldown", &self.retry_cooldown)
            .field("default_entry", &self.default_entry)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl CostModel {
    pub fn new(source: Arc<dyn PricingSource>, config: &PricingConfig) -> Self {
        Self {
            source,
            ttl: config.ttl,
            retry_cooldown: config.retry_cooldown,
            default_entry: config.default_entry.clone(),
            cache: config.cache_path.clone().map(PricingCacheFile::new),
            state: Mutex::new(PricingState::default()),
        }
    }

    /// Cost of one call to `model_id`
    pub async fn calculate(
        &self,
        model_id: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
    ) -> CostEstimate {
        self.calculate_at(model_id, prompt_tokens, completion_tokens, Utc::now())
            .await
    }

    /// [`calculate`](Self::calculate) with an explicit clock
    pub async fn calculate_at(
        &self,
        model_id: &str,
        prompt_tokens: u32,
        completion_tokens: u32,
        now: DateTime<Utc>,
    ) -> CostEstimate {
        let mut state = self.state.lock().await;
        self.load_cache(&mut state).await;

        if self.should_refresh(&state, now) {
            // Failures are already logged and leave the previous table in place
            let _ = self.refresh_locked(&mut state, now).await;
        }

        let resolved = state
            .table
            .as_ref()
            .and_then(|current| resolve(current, model_id))
            .or_else(|| {
                self.default_entry
                    .as_ref()
                    .map(|entry| (entry.model_id.clone(), entry))
            });

        match resolved {
            Some((pricing_key, entry)) => {
                let cost = entry.cost(prompt_tokens, completion_tokens);
                log_debug!(
                    model_id = model_id,
                    pricing_key = %pricing_key,
                    prompt_tokens = prompt_tokens,
                    completion_tokens = completion_tokens,
                    cost = cost,
                    "Cost computed"
                );
                CostEstimate::Priced { cost, pricing_key }
            }
            None => {
                log_warn!(
                    model_id = model_id,
                    "No pricing entry for model, cost unknown"
                );
                CostEstimate::Unknown
            }
        }
    }

    /// Fetch a new table now, regardless of its age or the retry cooldown
    ///
    /// # Errors
    ///
    /// `PricingUnavailable` when the source fails; the current table is kept.
    pub async fn refresh(&self) -> LlmResult<usize> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state, Utc::now()).await
    }

    /// When the current table was fetched, if there is one
    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        let mut state = self.state.lock().await;
        self.load_cache(&mut state).await;
        state.table.as_ref().map(PricingTable::last_refreshed)
    }

    /// Read the cache file once, before anything else touches the table
    async fn load_cache(&self, state: &mut PricingState) {
        if state.cache_checked {
            return;
        }
        state.cache_checked = true;

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.load().await {
                state.table = Some(cached);
            }
        }
    }

    fn should_refresh(&self, state: &PricingState, now: DateTime<Utc>) -> bool {
        let stale = state
            .table
            .as_ref()
            .map_or(true, |current| !current.is_fresh(now, self.ttl));
        if !stale {
            return false;
        }

        match state.failed_at {
            Some(failed_at) => {
                let waited = (now - failed_at).to_std().unwrap_or(Duration::ZERO);
                if waited < self.retry_cooldown {
                    log_debug!(
                        failed_at = %failed_at,
                        cooldown_secs = self.retry_cooldown.as_secs(),
                        "Pricing refresh skipped during retry cooldown"
                    );
                    return false;
                }
                true
            }
            None => true,
        }
    }

    async fn refresh_locked(
        &self,
        state: &mut PricingState,
        now: DateTime<Utc>,
    ) -> LlmResult<usize> {
        match self.fetch_table(now).await {
            Ok(fresh) => {
                let count = fresh.len();
                if let Some(cache) = &self.cache {
                    // A table that cannot be cached is still usable in memory
                    let _ = cache.store(&fresh).await;
                }
                state.table = Some(fresh);
                state.failed_at = None;
                Ok(count)
            }
            Err(e) => {
                state.failed_at = Some(now);
                Err(e)
            }
        }
    }

    async fn fetch_table(&self, now: DateTime<Utc>) -> LlmResult<PricingTable> {
        match self.source.fetch().await {
            Ok(entries) => {
                log_info!(models = entries.len(), "Pricing table refreshed");
                Ok(PricingTable::new(entries, now))
            }
            Err(e) => Err(LlmError::pricing_unavailable(format!(
                "Pricing refresh failed, keeping previous table: {e}"
            ))),
        }
    }
}

/// Table lookup in candidate order, then by last path segment
fn resolve<'a>(table: &'a PricingTable, model_id: &str) -> Option<(String, &'a PricingEntry)> {
    let candidates = candidate_keys(model_id);

    if let Some(found) = candidates
        .iter()
        .find_map(|key| table.get(key).map(|entry| (key.clone(), entry)))
    {
        return Some(found);
    }

    let bare = candidates.first()?.rsplit('/').next()?;
    table
        .find_by_suffix(bare)
        .map(|(key, entry)| (key.to_string(), entry))
}

/// Pricing keys to try for `model_id`, most specific first:
/// untagged id, `vendor/model` for tagged bare names, bare model, raw id.
pub(crate) fn candidate_keys(model_id: &str) -> Vec<String> {
    let raw = model_id.trim();

    let (provider, untagged) = match raw.split_once(':') {
        Some((tag, rest)) if !tag.contains('/') => match Provider::from_tag(tag) {
            Some(provider) => (Some(provider), rest.trim()),
            None => (None, raw),
        },
        _ => (None, raw),
    };

    let mut keys = vec![untagged.to_string()];
    if !untagged.contains('/') {
        if let Some(vendor) = provider.and_then(|p| p.vendor_slug()) {
            keys.push(format!("{vendor}/{untagged}"));
        }
    }
    if let Some((_, bare)) = untagged.rsplit_once('/') {
        keys.push(bare.to_string());
    }
    keys.push(raw.to_string());

    let mut seen = std::collections::HashSet::new();
    keys.retain(|key| !key.is_empty() && seen.insert(key.clone()));
    keys
}
