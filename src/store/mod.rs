//! In-process snapshot of site content with actions that keep storage in step.
//!
//! The snapshot is authoritative for the running context. Every action
//! validates, mutates the snapshot under a lock, then hands the affected
//! keys to the [`Mirror`] without waiting. If a mirrored write fails the two
//! diverge until the next [`ContentStore::reload`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;
use validator::Validate;

use crate::{
    config::ContentConfig,
    domain::{
        display_date, seed, Comment, CommunityPost, Notice, NoticeDraft, NoticeUpdate, PostDraft,
        PostKind, PostRef, PostUpdate, User,
    },
    error::{AppError, Result},
    id::IdGenerator,
    repository::{
        CommentRepository, JsonCommentRepository, JsonNoticeRepository, JsonPostRepository,
        JsonViewMarkerRepository, NoticeRepository, PostRepository, ViewMarkerRepository,
    },
    storage::{keys, JsonStorage},
};

pub mod collection;
pub mod mirror;
pub mod views;

pub use collection::{Collection, Source};
pub use mirror::Mirror;
pub use views::{view_counts, ViewOutcome, VIEW_WINDOW_MS};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub mirror_debounce: Duration,
    pub view_window_ms: i64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            mirror_debounce: Duration::from_millis(300),
            view_window_ms: VIEW_WINDOW_MS,
        }
    }
}

impl From<&ContentConfig> for StoreOptions {
    fn from(config: &ContentConfig) -> Self {
        Self {
            mirror_debounce: Duration::from_millis(config.mirror_debounce_ms),
            view_window_ms: config.view_window_ms,
        }
    }
}

/// Point-in-time copy of everything the store holds.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub notices: Vec<Notice>,
    pub posts: Vec<CommunityPost>,
    pub comments: Vec<Comment>,
}

struct State {
    notices: Collection<Notice>,
    posts: Collection<CommunityPost>,
    comments: Vec<Comment>,
    view_marks: HashMap<String, i64>,
}

struct Loaded {
    notices: Collection<Notice>,
    posts: Collection<CommunityPost>,
    comments: Vec<Comment>,
}

pub struct ContentStore {
    storage: JsonStorage,
    state: RwLock<State>,
    ids: Arc<IdGenerator>,
    mirror: Mirror,
    revision: watch::Sender<u64>,
    view_window_ms: i64,
}

impl ContentStore {
    /// Builds the snapshot from the compiled-in seed and whatever the
    /// storage holds. Must be called inside a tokio runtime.
    pub async fn open(storage: JsonStorage, ids: Arc<IdGenerator>, options: StoreOptions) -> Result<Self> {
        let loaded = Self::load(&storage).await;
        observe_ids(&ids, &loaded)?;

        tracing::info!(
            notices = loaded.notices.user.len(),
            posts = loaded.posts.user.len(),
            comments = loaded.comments.len(),
            "Content store opened"
        );

        let (revision, _) = watch::channel(0);
        Ok(Self {
            mirror: Mirror::spawn(storage.clone(), options.mirror_debounce),
            storage,
            state: RwLock::new(State {
                notices: loaded.notices,
                posts: loaded.posts,
                comments: loaded.comments,
                view_marks: HashMap::new(),
            }),
            ids,
            revision,
            view_window_ms: options.view_window_ms,
        })
    }

    async fn load(storage: &JsonStorage) -> Loaded {
        let user_notices = JsonNoticeRepository::new(storage.clone()).load_all().await;
        let user_posts = JsonPostRepository::new(storage.clone()).load_all().await;
        let comments = JsonCommentRepository::new(storage.clone()).load_everything().await;
        let seed_notices = storage.get(keys::SEED_NOTICES, seed::seed_notices()).await;
        let seed_posts = storage.get(keys::SEED_POSTS, seed::seed_posts()).await;

        Loaded {
            notices: Collection::new(user_notices, seed_notices),
            posts: Collection::new(user_posts, seed_posts),
            comments,
        }
    }

    /// Re-reads persisted content, replacing the in-memory copy.
    pub async fn reload(&self) -> Result<()> {
        let loaded = Self::load(&self.storage).await;
        observe_ids(&self.ids, &loaded)?;

        {
            let mut state = self.write()?;
            state.notices = loaded.notices;
            state.posts = loaded.posts;
            state.comments = loaded.comments;
        }

        tracing::debug!("Content store reloaded");
        self.bump();
        Ok(())
    }

    /// Follows writes made by other contexts on the same storage and reloads
    /// when content keys change. Last write wins; nothing is merged.
    pub fn watch_storage(self: &Arc<Self>) -> JoinHandle<()> {
        let mut events = self.storage.subscribe();
        let origin = self.storage.origin();
        let store = Arc::downgrade(self);

        tokio::spawn(async move {
            loop {
                let reload = match events.recv().await {
                    Ok(event) => event.origin != origin && is_content_key(&event.key),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Storage events lagged, reloading");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
                if !reload {
                    continue;
                }

                let Some(live) = store.upgrade() else { break };
                if let Err(e) = live.reload().await {
                    tracing::warn!("Reload after storage change failed: {}", e);
                }
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    pub async fn flush(&self) -> Result<()> {
        self.mirror.flush().await
    }

    // Reads

    pub fn snapshot(&self) -> Result<Snapshot> {
        let state = self.read()?;
        Ok(Snapshot {
            notices: state.notices.merged(),
            posts: state.posts.merged(),
            comments: state.comments.clone(),
        })
    }

    pub fn notices(&self) -> Result<Vec<Notice>> {
        Ok(self.read()?.notices.merged())
    }

    pub fn posts(&self) -> Result<Vec<CommunityPost>> {
        Ok(self.read()?.posts.merged())
    }

    /// Notices written through this store, excluding seed content.
    pub fn user_notices(&self) -> Result<Vec<Notice>> {
        Ok(self.read()?.notices.user.clone())
    }

    pub fn user_posts(&self) -> Result<Vec<CommunityPost>> {
        Ok(self.read()?.posts.user.clone())
    }

    pub fn notice(&self, id: i64) -> Result<Option<Notice>> {
        Ok(self.read()?.notices.get(id).cloned())
    }

    pub fn post(&self, id: i64) -> Result<Option<CommunityPost>> {
        Ok(self.read()?.posts.get(id).cloned())
    }

    pub fn comments_for(&self, target: PostRef) -> Result<Vec<Comment>> {
        Ok(self
            .read()?
            .comments
            .iter()
            .filter(|c| c.target() == target)
            .cloned()
            .collect())
    }

    /// Whether the entry was written by a visitor rather than shipped as seed.
    pub fn is_user_generated(&self, target: PostRef) -> Result<bool> {
        let state = self.read()?;
        let source = match target.kind {
            PostKind::Notice => state.notices.source_of(target.id),
            PostKind::Post => state.posts.source_of(target.id),
        };
        Ok(source == Some(Source::User))
    }

    // Notices

    pub fn add_notice(&self, actor: &User, mut draft: NoticeDraft) -> Result<Notice> {
        require_admin(actor)?;
        draft.title = draft.title.trim().to_string();
        draft.content = sanitize(&draft.content);
        draft.validate()?;

        let notice = Notice {
            id: self.ids.next()?,
            title: draft.title,
            content: draft.content,
            author: actor.name.clone(),
            date: display_date(Local::now()),
            views: 0,
            likes: 0,
            notice_type: draft.notice_type,
            is_important: draft.is_important,
            is_pinned: false,
        };

        {
            let mut state = self.write()?;
            state.notices.user.insert(0, notice.clone());
            self.mirror_notices(&state, Source::User);
        }
        self.mirror_ids()?;
        self.bump();

        tracing::info!(id = notice.id, "Notice added");
        Ok(notice)
    }

    pub fn update_notice(&self, actor: &User, id: i64, mut update: NoticeUpdate) -> Result<Notice> {
        require_admin(actor)?;
        update.title = update.title.map(|t| t.trim().to_string());
        update.content = update.content.map(|c| sanitize(&c));
        update.validate()?;

        let updated = {
            let mut state = self.write()?;
            let (source, notice) = state
                .notices
                .get_mut(id)
                .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;

            if let Some(title) = update.title {
                notice.title = title;
            }
            if let Some(content) = update.content {
                notice.content = content;
            }
            if let Some(notice_type) = update.notice_type {
                notice.notice_type = notice_type;
            }
            if let Some(is_important) = update.is_important {
                notice.is_important = is_important;
            }
            let updated = notice.clone();
            self.mirror_notices(&state, source);
            updated
        };

        self.bump();
        Ok(updated)
    }

    /// Removes a visitor-written notice and its comments. Seed notices
    /// cannot be deleted.
    pub fn delete_notice(&self, actor: &User, id: i64) -> Result<()> {
        require_admin(actor)?;

        {
            let mut state = self.write()?;
            match state.notices.source_of(id) {
                None => return Err(AppError::NotFound("Notice not found".to_string())),
                Some(Source::Seed) => return Err(AppError::Forbidden),
                Some(Source::User) => {}
            }
            state.notices.remove_user(id);
            self.drop_comments(&mut state, PostRef::notice(id));
            self.mirror_notices(&state, Source::User);
        }

        self.bump();
        tracing::info!(id, "Notice deleted");
        Ok(())
    }

    pub fn toggle_pin_notice(&self, actor: &User, id: i64) -> Result<Notice> {
        require_admin(actor)?;

        let updated = {
            let mut state = self.write()?;
            let (source, notice) = state
                .notices
                .get_mut(id)
                .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;
            notice.is_pinned = !notice.is_pinned;
            let updated = notice.clone();
            self.mirror_notices(&state, source);
            updated
        };

        self.bump();
        Ok(updated)
    }

    // Community posts

    pub fn add_post(&self, actor: &User, mut draft: PostDraft) -> Result<CommunityPost> {
        draft.title = draft.title.trim().to_string();
        draft.content = sanitize(&draft.content);
        draft.validate()?;

        let post = CommunityPost {
            id: self.ids.next()?,
            title: draft.title,
            content: draft.content,
            author: actor.name.clone(),
            grade: actor.grade.clone(),
            date: display_date(Local::now()),
            views: 0,
            likes: 0,
            category: draft.category,
            is_pinned: false,
        };

        {
            let mut state = self.write()?;
            state.posts.user.insert(0, post.clone());
            self.mirror_posts(&state, Source::User);
        }
        self.mirror_ids()?;
        self.bump();

        tracing::info!(id = post.id, "Post added");
        Ok(post)
    }

    pub fn update_post(&self, actor: &User, id: i64, mut update: PostUpdate) -> Result<CommunityPost> {
        update.title = update.title.map(|t| t.trim().to_string());
        update.content = update.content.map(|c| sanitize(&c));
        update.validate()?;

        let updated = {
            let mut state = self.write()?;
            let (source, post) = state
                .posts
                .get_mut(id)
                .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

            if !actor.is_admin() && !actor.wrote(&post.author, &post.grade) {
                return Err(AppError::Forbidden);
            }

            if let Some(title) = update.title {
                post.title = title;
            }
            if let Some(content) = update.content {
                post.content = content;
            }
            if let Some(category) = update.category {
                post.category = category;
            }
            let updated = post.clone();
            self.mirror_posts(&state, source);
            updated
        };

        self.bump();
        Ok(updated)
    }

    /// Removes a visitor-written post and its comments. Allowed for the
    /// author and for admins; seed posts cannot be deleted.
    pub fn delete_post(&self, actor: &User, id: i64) -> Result<()> {
        {
            let mut state = self.write()?;
            let post = state
                .posts
                .get(id)
                .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

            if !actor.is_admin() && !actor.wrote(&post.author, &post.grade) {
                return Err(AppError::Forbidden);
            }
            if state.posts.source_of(id) == Some(Source::Seed) {
                return Err(AppError::Forbidden);
            }

            state.posts.remove_user(id);
            self.drop_comments(&mut state, PostRef::post(id));
            self.mirror_posts(&state, Source::User);
        }

        self.bump();
        tracing::info!(id, "Post deleted");
        Ok(())
    }

    pub fn toggle_pin_post(&self, actor: &User, id: i64) -> Result<CommunityPost> {
        require_admin(actor)?;

        let updated = {
            let mut state = self.write()?;
            let (source, post) = state
                .posts
                .get_mut(id)
                .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
            post.is_pinned = !post.is_pinned;
            let updated = post.clone();
            self.mirror_posts(&state, source);
            updated
        };

        self.bump();
        Ok(updated)
    }

    // Comments

    /// Appends a comment. The target is not checked; comments on missing
    /// posts are kept and shown with a placeholder title.
    pub fn add_comment(&self, actor: &User, target: PostRef, content: &str) -> Result<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Comment content is required".to_string()));
        }

        let comment = Comment {
            id: self.ids.next()?,
            author: actor.name.clone(),
            grade: actor.grade.clone(),
            content: content.to_string(),
            date: display_date(Local::now()),
            post_id: target.id,
            post_type: target.kind,
        };

        {
            let mut state = self.write()?;
            state.comments.push(comment.clone());
            self.mirror_comments(&state, target);
        }
        self.mirror_ids()?;
        self.bump();

        Ok(comment)
    }

    pub fn delete_comment(&self, actor: &User, id: i64) -> Result<()> {
        {
            let mut state = self.write()?;
            let index = state
                .comments
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

            let comment = &state.comments[index];
            if !actor.is_admin() && !actor.wrote(&comment.author, &comment.grade) {
                return Err(AppError::Forbidden);
            }

            let removed = state.comments.remove(index);
            self.mirror_comments(&state, removed.target());
        }

        self.bump();
        Ok(())
    }

    // Views

    pub async fn record_view(&self, target: PostRef) -> Result<ViewOutcome> {
        self.record_view_at(target, Utc::now().timestamp_millis()).await
    }

    /// Counts a visit to a detail page unless this client already visited
    /// within the view window.
    pub async fn record_view_at(&self, target: PostRef, now_ms: i64) -> Result<ViewOutcome> {
        let key = keys::last_view(target.kind, target.id);

        let cached = self.read()?.view_marks.get(&key).copied();
        let stored = match cached {
            Some(at) => Some(at),
            None => {
                JsonViewMarkerRepository::new(self.storage.clone())
                    .last_view(target.kind, target.id)
                    .await
            }
        };

        let mut state = self.write()?;
        let last_seen = state.view_marks.get(&key).copied().or(stored);
        let counted = view_counts(last_seen, now_ms, self.view_window_ms);

        let views = match target.kind {
            PostKind::Notice => {
                let (source, notice) = state
                    .notices
                    .get_mut(target.id)
                    .ok_or_else(|| AppError::NotFound("Notice not found".to_string()))?;
                if counted {
                    notice.views += 1;
                }
                let views = notice.views;
                if counted {
                    self.mirror_notices(&state, source);
                }
                views
            }
            PostKind::Post => {
                let (source, post) = state
                    .posts
                    .get_mut(target.id)
                    .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
                if counted {
                    post.views += 1;
                }
                let views = post.views;
                if counted {
                    self.mirror_posts(&state, source);
                }
                views
            }
        };

        if counted {
            state.view_marks.insert(key.clone(), now_ms);
            self.mirror.write(key, &now_ms);
        } else if let Some(at) = last_seen {
            state.view_marks.entry(key).or_insert(at);
        }
        drop(state);

        if counted {
            self.bump();
        }
        Ok(ViewOutcome { views, counted })
    }

    // Internals

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|e| AppError::Internal(format!("Content store lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|e| AppError::Internal(format!("Content store lock poisoned: {}", e)))
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }

    fn drop_comments(&self, state: &mut State, target: PostRef) {
        let before = state.comments.len();
        state.comments.retain(|c| c.target() != target);
        if state.comments.len() != before {
            tracing::debug!(removed = before - state.comments.len(), "Dropped comments with their post");
        }
        self.mirror.remove(keys::comments(target));
    }

    fn mirror_notices(&self, state: &State, source: Source) {
        match source {
            Source::User => self.mirror.write(keys::TEMP_NOTICES, &state.notices.user),
            Source::Seed => self.mirror.write(keys::SEED_NOTICES, &state.notices.seed),
        }
    }

    fn mirror_posts(&self, state: &State, source: Source) {
        match source {
            Source::User => self.mirror.write(keys::TEMP_POSTS, &state.posts.user),
            Source::Seed => self.mirror.write(keys::SEED_POSTS, &state.posts.seed),
        }
    }

    fn mirror_comments(&self, state: &State, target: PostRef) {
        let comments: Vec<&Comment> = state.comments.iter().filter(|c| c.target() == target).collect();
        self.mirror.write(keys::comments(target), &comments);
    }

    fn mirror_ids(&self) -> Result<()> {
        self.mirror.write(keys::ID_HIGH_WATER_MARK, &self.ids.high_water()?);
        Ok(())
    }
}

fn require_admin(actor: &User) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

fn sanitize(html: &str) -> String {
    ammonia::clean(html).trim().to_string()
}

fn observe_ids(ids: &IdGenerator, loaded: &Loaded) -> Result<()> {
    let max = [
        loaded.notices.max_id(),
        loaded.posts.max_id(),
        loaded.comments.iter().map(|c| c.id).max(),
    ]
    .into_iter()
    .flatten()
    .max();

    if let Some(max) = max {
        ids.observe(max)?;
    }
    Ok(())
}

fn is_content_key(key: &str) -> bool {
    matches!(
        key,
        keys::TEMP_NOTICES | keys::TEMP_POSTS | keys::SEED_NOTICES | keys::SEED_POSTS
    ) || key.starts_with(keys::COMMENTS_PREFIX)
}
