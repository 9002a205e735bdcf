use std::sync::Arc;

use serde::Serialize;

use crate::{
    domain::{Comment, CommunityPost, Notice, PostKind, User},
    error::Result,
    selectors::{sort_for_display, MISSING_TITLE},
    store::ContentStore,
};

/// A comment together with the title of the post it was left on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentActivity {
    pub comment: Comment,
    pub post_title: String,
}

/// Everything a member has written, as shown on their own page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyActivity {
    pub posts: Vec<CommunityPost>,
    pub notices: Vec<Notice>,
    pub comments: Vec<CommentActivity>,
}

pub struct ActivityService {
    store: Arc<ContentStore>,
}

impl ActivityService {
    pub fn new(store: Arc<ContentStore>) -> Self {
        Self { store }
    }

    /// Only user-generated entries count; seed content has no real author.
    /// Notices match on name alone since admins post under their name.
    pub fn my_activity(&self, actor: &User) -> Result<MyActivity> {
        let snapshot = self.store.snapshot()?;

        let posts = self
            .store
            .user_posts()?
            .into_iter()
            .filter(|p| actor.wrote(&p.author, &p.grade))
            .collect();

        let notices = self
            .store
            .user_notices()?
            .into_iter()
            .filter(|n| n.author == actor.name)
            .collect();

        let mut comments: Vec<CommentActivity> = snapshot
            .comments
            .iter()
            .filter(|c| actor.wrote(&c.author, &c.grade))
            .map(|c| {
                let title = match c.post_type {
                    PostKind::Notice => snapshot
                        .notices
                        .iter()
                        .find(|n| n.id == c.post_id)
                        .map(|n| n.title.clone()),
                    PostKind::Post => snapshot
                        .posts
                        .iter()
                        .find(|p| p.id == c.post_id)
                        .map(|p| p.title.clone()),
                };
                CommentActivity {
                    comment: c.clone(),
                    post_title: title.unwrap_or_else(|| MISSING_TITLE.to_string()),
                }
            })
            .collect();
        comments.sort_by(|a, b| b.comment.id.cmp(&a.comment.id));

        Ok(MyActivity {
            posts: sort_for_display(posts),
            notices: sort_for_display(notices),
            comments,
        })
    }
}
