use crate::error::{LlmError, LlmResult};
use crate::internals::fs::{sibling_path, write_atomic};
use crate::logging::{log_debug, log_warn};
use crate::usage::ledger::{UsageLedger, UsageSummary};
use crate::usage::store::{CostRecord, UsageStore};

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// [`UsageStore`] persisting its ledger as a pretty-printed JSON file.
///
/// The whole ledger is rewritten after every event, through a temporary file
/// renamed over the target. A file that cannot be parsed is moved aside to
/// `<path>.corrupt` before an empty ledger takes its place.
#[derive(Debug)]
pub struct JsonFileUsageStore {
    path: PathBuf,
    ledger: Mutex<UsageLedger>,
}

impl JsonFileUsageStore {
    /// Load the ledger at `path`; a missing or unreadable file starts empty
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let ledger = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<UsageLedger>(&raw) {
                Ok(ledger) => ledger,
                Err(e) => {
                    quarantine(&path, &e).await;
                    UsageLedger::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => UsageLedger::default(),
            Err(e) => {
                log_warn!(
                    path = %path.display(),
                    error = %e,
                    "Usage file could not be read, starting an empty ledger"
                );
                UsageLedger::default()
            }
        };

        Self {
            path,
            ledger: Mutex::new(ledger),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn summary(&self, now: DateTime<Utc>) -> UsageSummary {
        self.ledger.lock().await.summary(now)
    }

    async fn update<F>(&self, apply: F) -> LlmResult<()>
    where
        F: FnOnce(&mut UsageLedger) + Send,
    {
        let mut ledger = self.ledger.lock().await;
        apply(&mut ledger);

        let json = serde_json::to_string_pretty(&*ledger)
            .map_err(|e| LlmError::storage_failed(format!("Failed to serialise ledger: {e}")))?;

        write_atomic(&self.path, json.as_bytes())
            .await
            .map_err(|e| {
                LlmError::storage_failed(format!("Failed to write {}: {e}", self.path.display()))
            })?;

        log_debug!(path = %self.path.display(), "Usage ledger saved");
        Ok(())
    }
}

/// Move an unparsable ledger out of the way so the next save cannot destroy it
async fn quarantine(path: &Path, error: &serde_json::Error) {
    let corrupt_path = sibling_path(path, "corrupt");
    match tokio::fs::rename(path, &corrupt_path).await {
        Ok(()) => log_warn!(
            path = %path.display(),
            moved_to = %corrupt_path.display(),
            error = %error,
            "Usage file is corrupt, moved aside and starting an empty ledger"
        ),
        Err(e) => log_warn!(
            path = %path.display(),
            error = %error,
            rename_error = %e,
            "Usage file is corrupt and could not be moved aside, starting an empty ledger"
        ),
    }
}

#[async_trait::async_trait]
impl UsageStore for JsonFileUsageStore {
    async fn record_cost(&self, record: &CostRecord) -> LlmResult<()> {
        self.update(|ledger| ledger.record_cost(record)).await
    }

    async fn record_tool_call(&self, tool_name: &str) -> LlmResult<()> {
        let now = Utc::now();
        self.update(|ledger| ledger.record_tool_call(tool_name, now))
            .await
    }

    async fn record_fill_percentage(
        &self,
        schema_name: &str,
        model_id: &str,
        fill_percentage: f64,
    ) -> LlmResult<()> {
        let now = Utc::now();
        self.update(|ledger| {
            ledger.record_fill_percentage(schema_name, model_id, fill_percentage, now)
        })
        .await
    }
}
