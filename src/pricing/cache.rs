use crate::error::{LlmError, LlmResult};
use crate::internals::fs::write_atomic;
use crate::logging::{log_debug, log_warn};
use crate::pricing::table::PricingTable;

use std::path::{Path, PathBuf};

/// Pricing table kept on disk as JSON, together with the time it was fetched.
///
/// Lets a restarted process reuse a table that is still within its TTL
/// instead of fetching a new one.
#[derive(Debug, Clone)]
pub struct PricingCacheFile {
    path: PathBuf,
}

impl PricingCacheFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The cached table; `None` when the file is missing or cannot be parsed
    pub async fn load(&self) -> Option<PricingTable> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                log_warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Pricing cache could not be read"
                );
                return None;
            }
        };

        match serde_json::from_str::<PricingTable>(&raw) {
            Ok(table) => {
                log_debug!(
                    path = %self.path.display(),
                    models = table.len(),
                    last_refreshed = %table.last_refreshed(),
                    "Pricing cache loaded"
                );
                Some(table)
            }
            Err(e) => {
                log_warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Pricing cache is not valid JSON, ignoring it"
                );
                None
            }
        }
    }

    /// Replace the cached table
    ///
    /// # Errors
    ///
    /// `StorageFailed` when the table cannot be serialised or written.
    pub async fn store(&self, table: &PricingTable) -> LlmResult<()> {
        let json = serde_json::to_string_pretty(table).map_err(|e| {
            LlmError::storage_failed(format!("Failed to serialise pricing table: {e}"))
        })?;

        write_atomic(&self.path, json.as_bytes())
            .await
            .map_err(|e| {
                LlmError::storage_failed(format!("Failed to write {}: {e}", self.path.display()))
            })?;

        log_debug!(path = %self.path.display(), "Pricing cache saved");
        Ok(())
    }
}
