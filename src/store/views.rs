use serde::{Deserialize, Serialize};

/// Revisits inside this window do not count again.
pub const VIEW_WINDOW_MS: i64 = 86_400_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOutcome {
    pub views: u64,
    pub counted: bool,
}

/// True when a visit at `now_ms` should bump the counter.
pub fn view_counts(last_seen_ms: Option<i64>, now_ms: i64, window_ms: i64) -> bool {
    match last_seen_ms {
        None => true,
        Some(last) => now_ms - last > window_ms,
    }
}
