use async_trait::async_trait;

use crate::{
    domain::DuesPledge,
    error::Result,
    repository::DuesRepository,
    storage::{keys, JsonStorage},
};

pub struct JsonDuesRepository {
    storage: JsonStorage,
}

impl JsonDuesRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl DuesRepository for JsonDuesRepository {
    async fn load_all(&self) -> Vec<DuesPledge> {
        self.storage.get_or_default(keys::DUES_PLEDGES).await
    }

    async fn add(&self, pledge: DuesPledge) -> Result<()> {
        let mut pledges = self.load_all().await;
        pledges.push(pledge);
        self.save_all(&pledges).await
    }

    async fn save_all(&self, pledges: &[DuesPledge]) -> Result<()> {
        self.storage.set(keys::DUES_PLEDGES, pledges).await
    }
}
