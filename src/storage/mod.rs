use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::Result;

pub mod keys;
pub mod memory;
pub mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

/// A per-origin string store, the equivalent of a browser's local storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
    async fn remove_item(&self, key: &str) -> Result<()>;
    async fn keys(&self) -> Result<Vec<String>>;
}

/// Published after every successful write or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// Handle that performed the write; see [`JsonStorage::fork`].
    pub origin: Uuid,
}

const EVENT_CAPACITY: usize = 256;

/// Size in the unit quotas are expressed in: characters of key plus value.
pub(crate) fn entry_size(key: &str, value: &str) -> u64 {
    (key.chars().count() + value.chars().count()) as u64
}

/// JSON view over a [`KeyValueStore`].
///
/// Reads never fail: anything missing or unreadable yields the caller's
/// default. Writes report failures as an `AppError` carrying
/// `STORAGE_ERROR` or `STORAGE_QUOTA_EXCEEDED` and are never retried.
#[derive(Clone)]
pub struct JsonStorage {
    backend: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<StorageEvent>,
    origin: Uuid,
}

impl JsonStorage {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            backend,
            events,
            origin: Uuid::new_v4(),
        }
    }

    /// Another handle on the same store with its own origin, as a second
    /// browser tab would have.
    pub fn fork(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            events: self.events.clone(),
            origin: Uuid::new_v4(),
        }
    }

    pub fn origin(&self) -> Uuid {
        self.origin
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
        self.events.subscribe()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get_item(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                tracing::warn!(key, "Storage read failed, using default: {}", e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "Stored value is not valid JSON, using default: {}", e);
                default
            }
        }
    }

    pub async fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.get(key, T::default()).await
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(|e| {
            tracing::error!(key, "Failed to encode value: {}", e);
            crate::error::AppError::from(e)
        })?;

        if let Err(e) = self.backend.set_item(key, &raw).await {
            tracing::error!(key, code = %e.code(), "Storage write failed: {}", e);
            return Err(e);
        }

        self.publish(key);
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        if let Err(e) = self.backend.remove_item(key).await {
            tracing::error!(key, "Storage removal failed: {}", e);
            return Err(e);
        }

        self.publish(key);
        Ok(())
    }

    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        match self.backend.keys().await {
            Ok(keys) => keys.into_iter().filter(|k| k.starts_with(prefix)).collect(),
            Err(e) => {
                tracing::warn!(prefix, "Failed to list storage keys: {}", e);
                Vec::new()
            }
        }
    }

    fn publish(&self, key: &str) {
        // No subscribers is the normal case for a single context.
        let _ = self.events.send(StorageEvent {
            key: key.to_string(),
            origin: self.origin,
        });
    }
}
