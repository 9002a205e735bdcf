use async_trait::async_trait;

use crate::{
    domain::CommunityPost,
    error::Result,
    repository::PostRepository,
    storage::{keys, JsonStorage},
};

pub struct JsonPostRepository {
    storage: JsonStorage,
}

impl JsonPostRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl PostRepository for JsonPostRepository {
    async fn load_all(&self) -> Vec<CommunityPost> {
        self.storage.get_or_default(keys::TEMP_POSTS).await
    }

    async fn add(&self, post: CommunityPost) -> Result<()> {
        let mut posts = self.load_all().await;
        posts.insert(0, post);
        self.save_all(&posts).await
    }

    async fn remove(&self, id: i64) -> Result<()> {
        let mut posts = self.load_all().await;
        posts.retain(|p| p.id != id);
        self.save_all(&posts).await
    }

    async fn save_all(&self, posts: &[CommunityPost]) -> Result<()> {
        self.storage.set(keys::TEMP_POSTS, posts).await
    }
}
