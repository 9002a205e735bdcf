use crate::domain::{PostKind, PostRef};

pub const TEMP_NOTICES: &str = "tempNotices";
pub const TEMP_POSTS: &str = "tempPosts";
pub const SEED_NOTICES: &str = "seedNotices";
pub const SEED_POSTS: &str = "seedPosts";
pub const MEMBERS: &str = "members";
pub const USER_SESSION: &str = "userSession";
pub const ID_HIGH_WATER_MARK: &str = "idHighWaterMark";
pub const DUES_PLEDGES: &str = "duesPledges";
pub const COMMENTS_PREFIX: &str = "comments:";

pub fn comments(target: PostRef) -> String {
    format!("{}{}:{}", COMMENTS_PREFIX, target.kind, target.id)
}

/// Inverse of [`comments`]; `None` for keys outside the namespace.
pub fn parse_comments(key: &str) -> Option<PostRef> {
    let rest = key.strip_prefix(COMMENTS_PREFIX)?;
    let (kind, id) = rest.split_once(':')?;
    let kind = match kind {
        "post" => PostKind::Post,
        "notice" => PostKind::Notice,
        _ => return None,
    };
    Some(PostRef::new(kind, id.parse().ok()?))
}

pub fn last_view(kind: PostKind, id: i64) -> String {
    format!("{}_view_{}", kind, id)
}
