use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use super::{entry_size, KeyValueStore};

/// Process-local store. Quota and availability can be dialled in to
/// reproduce the failures a browser store produces.
pub struct MemoryKeyValueStore {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<u64>,
    disabled: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
            quota: None,
            disabled: AtomicBool::new(false),
        }
    }

    pub fn with_quota(quota: u64) -> Self {
        Self {
            quota: Some(quota),
            ..Self::new()
        }
    }

    /// While disabled every write fails with `STORAGE_ERROR`.
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn check_enabled(&self) -> Result<()> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(AppError::Storage("Storage is disabled".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_enabled()?;
        let mut entries = self.entries.write().await;

        if let Some(quota) = self.quota {
            let others: u64 = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let total = others + entry_size(key, value);
            if total > quota {
                return Err(AppError::StorageQuotaExceeded(format!(
                    "Writing '{}' needs {} of {} characters",
                    key, total, quota
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.check_enabled()?;
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}
