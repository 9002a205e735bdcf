use async_trait::async_trait;

use crate::{
    domain::PostKind,
    error::Result,
    storage::{keys, JsonStorage},
};

/// Last time this client opened a notice or post, in epoch milliseconds.
#[async_trait]
pub trait ViewMarkerRepository: Send + Sync {
    async fn last_view(&self, kind: PostKind, id: i64) -> Option<i64>;
    async fn mark_viewed(&self, kind: PostKind, id: i64, at_ms: i64) -> Result<()>;
}

pub struct JsonViewMarkerRepository {
    storage: JsonStorage,
}

impl JsonViewMarkerRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ViewMarkerRepository for JsonViewMarkerRepository {
    async fn last_view(&self, kind: PostKind, id: i64) -> Option<i64> {
        self.storage.get(&keys::last_view(kind, id), None).await
    }

    async fn mark_viewed(&self, kind: PostKind, id: i64, at_ms: i64) -> Result<()> {
        self.storage.set(&keys::last_view(kind, id), &at_ms).await
    }
}
