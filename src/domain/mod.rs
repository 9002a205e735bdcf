pub mod notice;
pub mod post;
pub mod comment;
pub mod member;
pub mod dues;
pub mod seed;

pub use notice::*;
pub use post::*;
pub use comment::*;
pub use member::*;
pub use dues::*;

use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Anything that lives in a list ordered by pin state and recency.
pub trait Entity {
    fn id(&self) -> i64;
    fn is_pinned(&self) -> bool;
}

/// Selection in a list filter: every value, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter<T> {
    All,
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Filter::All
    }
}

impl<T: PartialEq> Filter<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Filter::All => true,
            Filter::Only(expected) => expected == value,
        }
    }
}

/// Sentinel labels that select everything.
pub const ALL_LABELS: [&str; 2] = ["전체", "all"];

impl<T: FromStr> FromStr for Filter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ALL_LABELS.iter().any(|label| label.eq_ignore_ascii_case(s.trim())) {
            return Ok(Filter::All);
        }
        s.parse().map(Filter::Only)
    }
}

/// Display date used on list rows, e.g. `2024.11.28`.
pub fn display_date(at: chrono::DateTime<chrono::Local>) -> String {
    at.format("%Y.%m.%d").to_string()
}
