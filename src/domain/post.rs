use std::str::FromStr;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use super::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    pub id: i64,
    pub title: String,
    /// Sanitized HTML
    pub content: String,
    pub author: String,
    /// Cohort label such as `85학번`
    pub grade: String,
    pub date: String,
    pub views: u64,
    pub likes: u64,
    pub category: Category,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Entity for CommunityPost {
    fn id(&self) -> i64 {
        self.id
    }

    fn is_pinned(&self) -> bool {
        self.is_pinned
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "동기회")]
    ClassReunion,
    #[serde(rename = "모교소식")]
    SchoolNews,
    #[serde(rename = "사업소개")]
    Business,
    #[serde(rename = "취업정보")]
    Jobs,
    #[serde(rename = "모임제안")]
    Meetups,
    #[serde(rename = "기타")]
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::ClassReunion,
        Category::SchoolNews,
        Category::Business,
        Category::Jobs,
        Category::Meetups,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ClassReunion => "동기회",
            Category::SchoolNews => "모교소식",
            Category::Business => "사업소개",
            Category::Jobs => "취업정보",
            Category::Meetups => "모임제안",
            Category::Other => "기타",
        }
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Invalid category: {}", s)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostDraft {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct PostUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub category: Option<Category>,
}
