use async_trait::async_trait;

use crate::{
    domain::Notice,
    error::Result,
    repository::NoticeRepository,
    storage::{keys, JsonStorage},
};

pub struct JsonNoticeRepository {
    storage: JsonStorage,
}

impl JsonNoticeRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl NoticeRepository for JsonNoticeRepository {
    async fn load_all(&self) -> Vec<Notice> {
        self.storage.get_or_default(keys::TEMP_NOTICES).await
    }

    async fn add(&self, notice: Notice) -> Result<()> {
        let mut notices = self.load_all().await;
        notices.insert(0, notice);
        self.save_all(&notices).await
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let mut notices = self.load_all().await;
        notices.retain(|n| n.id != id);
        self.save_all(&notices).await
    }

    async fn save_all(&self, notices: &[Notice]) -> Result<()> {
        self.storage.set(keys::TEMP_NOTICES, notices).await
    }
}
