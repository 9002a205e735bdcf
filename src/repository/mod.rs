use async_trait::async_trait;
use crate::domain::*;
use crate::error::Result;

pub mod notice_repository;
pub mod post_repository;
pub mod comment_repository;
pub mod member_repository;
pub mod dues_repository;
pub mod view_marker_repository;

pub use notice_repository::JsonNoticeRepository;
pub use post_repository::JsonPostRepository;
pub use comment_repository::JsonCommentRepository;
pub use member_repository::JsonMemberRepository;
pub use dues_repository::JsonDuesRepository;
pub use view_marker_repository::{JsonViewMarkerRepository, ViewMarkerRepository};

/// User-generated notices, newest first.
#[async_trait]
pub trait NoticeRepository: Send + Sync {
    async fn load_all(&self) -> Vec<Notice>;
    async fn add(&self, notice: Notice) -> Result<()>;
    async fn remove(&self, id: i64) -> Result<()>;
    async fn save_all(&self, notices: &[Notice]) -> Result<()>;
}

/// User-generated community posts, newest first.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn load_all(&self) -> Vec<CommunityPost>;
    async fn add(&self, post: CommunityPost) -> Result<()>;
    async fn remove(&self, id: i64) -> Result<()>;
    async fn save_all(&self, posts: &[CommunityPost]) -> Result<()>;
}

/// Comments namespaced per target, oldest first.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn load(&self, target: PostRef) -> Vec<Comment>;
    async fn add(&self, target: PostRef, comment: Comment) -> Result<()>;
    async fn remove(&self, target: PostRef, id: i64) -> Result<()>;
    async fn save(&self, target: PostRef, comments: &[Comment]) -> Result<()>;
    async fn remove_all(&self, target: PostRef) -> Result<()>;
    async fn load_everything(&self) -> Vec<Comment>;
}

#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn load_all(&self) -> Vec<Member>;
    async fn add(&self, member: Member) -> Result<()>;
    async fn find_by_email(&self, email: &str) -> Option<Member>;
    async fn update_status(&self, id: i64, is_active: bool) -> Result<Member>;
    async fn remove(&self, id: i64) -> Result<()>;
}

#[async_trait]
pub trait DuesRepository: Send + Sync {
    async fn load_all(&self) -> Vec<DuesPledge>;
    async fn add(&self, pledge: DuesPledge) -> Result<()>;
    async fn save_all(&self, pledges: &[DuesPledge]) -> Result<()>;
}
