use std::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub grade: String,
    pub content: String,
    pub date: String,
    pub post_id: i64,
    pub post_type: PostKind,
}

impl Comment {
    pub fn target(&self) -> PostRef {
        PostRef::new(self.post_type, self.post_id)
    }
}

/// Discriminates the two commentable collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Post,
    Notice,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::Post => "post",
            PostKind::Notice => "notice",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (kind, id) pair naming a notice or a community post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostRef {
    pub kind: PostKind,
    pub id: i64,
}

impl PostRef {
    pub fn new(kind: PostKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn post(id: i64) -> Self {
        Self::new(PostKind::Post, id)
    }

    pub fn notice(id: i64) -> Self {
        Self::new(PostKind::Notice, id)
    }
}
