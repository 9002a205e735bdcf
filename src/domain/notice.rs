use std::str::FromStr;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;
use super::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: i64,
    pub title: String,
    /// Sanitized HTML
    pub content: String,
    pub author: String,
    pub date: String,
    pub views: u64,
    pub likes: u64,
    #[serde(rename = "type")]
    pub notice_type: NoticeType,
    pub is_important: bool,
    #[serde(default)]
    pub is_pinned: bool,
}

impl Entity for Notice {
    fn id(&self) -> i64 {
        self.id
    }

    fn is_pinned(&self) -> bool {
        self.is_pinned
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeType {
    #[serde(rename = "일반")]
    General,
    #[serde(rename = "중요")]
    Important,
    #[serde(rename = "행사")]
    Event,
    #[serde(rename = "시스템")]
    System,
}

impl NoticeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeType::General => "일반",
            NoticeType::Important => "중요",
            NoticeType::Event => "행사",
            NoticeType::System => "시스템",
        }
    }
}

impl FromStr for NoticeType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "일반" | "general" => Ok(NoticeType::General),
            "중요" | "important" => Ok(NoticeType::Important),
            "행사" | "event" => Ok(NoticeType::Event),
            "시스템" | "system" => Ok(NoticeType::System),
            other => Err(AppError::Validation(format!("Invalid notice type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NoticeDraft {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub notice_type: NoticeType,
    pub is_important: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Validate)]
pub struct NoticeUpdate {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub content: Option<String>,
    pub notice_type: Option<NoticeType>,
    pub is_important: Option<bool>,
}
