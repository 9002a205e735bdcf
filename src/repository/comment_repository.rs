use async_trait::async_trait;

use crate::{
    domain::{Comment, PostRef},
    error::Result,
    repository::CommentRepository,
    storage::{keys, JsonStorage},
};

pub struct JsonCommentRepository {
    storage: JsonStorage,
}

impl JsonCommentRepository {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl CommentRepository for JsonCommentRepository {
    async fn load(&self, target: PostRef) -> Vec<Comment> {
        self.storage.get_or_default(&keys::comments(target)).await
    }

    async fn add(&self, target: PostRef, comment: Comment) -> Result<()> {
        let mut comments = self.load(target).await;
        comments.push(comment);
        self.save(target, &comments).await
    }

    async fn remove(&self, target: PostRef, id: i64) -> Result<()> {
        let mut comments = self.load(target).await;
        comments.retain(|c| c.id != id);
        self.save(target, &comments).await
    }

    async fn save(&self, target: PostRef, comments: &[Comment]) -> Result<()> {
        self.storage.set(&keys::comments(target), comments).await
    }

    async fn remove_all(&self, target: PostRef) -> Result<()> {
        self.storage.remove(&keys::comments(target)).await
    }

    /// Every stored comment, grouped by key in key order, each group oldest first.
    async fn load_everything(&self) -> Vec<Comment> {
        let mut all = Vec::new();
        for key in self.storage.keys_with_prefix(keys::COMMENTS_PREFIX).await {
            if keys::parse_comments(&key).is_none() {
                tracing::warn!(key, "Skipping malformed comment key");
                continue;
            }
            let comments: Vec<Comment> = self.storage.get_or_default(&key).await;
            all.extend(comments);
        }
        all
    }
}
