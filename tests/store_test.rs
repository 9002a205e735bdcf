use std::sync::Arc;
use std::time::Duration;

use dongmun::{
    domain::{
        Category, MemberRole, NoticeDraft, NoticeType, NoticeUpdate, PostDraft, PostKind, PostRef,
        PostUpdate, User,
    },
    error::{AppError, ErrorCode},
    id::IdGenerator,
    selectors::sort_for_display,
    storage::{JsonStorage, MemoryKeyValueStore},
    store::{ContentStore, StoreOptions, VIEW_WINDOW_MS},
};

fn options() -> StoreOptions {
    StoreOptions {
        mirror_debounce: Duration::ZERO,
        view_window_ms: VIEW_WINDOW_MS,
    }
}

async fn open(storage: &JsonStorage) -> anyhow::Result<ContentStore> {
    let ids = Arc::new(IdGenerator::load(storage).await);
    Ok(ContentStore::open(storage.clone(), ids, options()).await?)
}

fn admin() -> User {
    User {
        id: 1,
        email: "admin@goonsan.com".to_string(),
        name: "관리자".to_string(),
        grade: "관리자".to_string(),
        role: MemberRole::Admin,
    }
}

fn member(name: &str, grade: &str) -> User {
    User {
        id: 2,
        email: "user@goonsan.com".to_string(),
        name: name.to_string(),
        grade: grade.to_string(),
        role: MemberRole::User,
    }
}

fn draft(title: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        content: format!("<p>{}</p>", title),
        category: Category::Meetups,
    }
}

#[tokio::test]
async fn test_add_and_delete_survive_reload_in_order() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let user = member("김동문", "85학번");

    let a = store.add_post(&user, draft("첫 번째"))?;
    let b = store.add_post(&user, draft("두 번째"))?;
    let c = store.add_post(&user, draft("세 번째"))?;
    assert!(a.id < b.id && b.id < c.id);
    assert_eq!(a.author, "김동문");
    assert_eq!(a.grade, "85학번");

    store.delete_post(&user, b.id)?;
    store.flush().await?;

    let reopened = open(&storage).await?;
    let user_ids: Vec<i64> = reopened.user_posts()?.iter().map(|p| p.id).collect();
    assert_eq!(user_ids, vec![c.id, a.id]);

    let merged = reopened.posts()?;
    assert_eq!(merged.len(), 2 + dongmun::domain::seed::seed_posts().len());
    assert_eq!(merged[0].id, c.id);

    // Fresh ids keep climbing past everything already stored.
    let d = reopened.add_post(&user, draft("네 번째"))?;
    assert!(d.id > c.id);

    Ok(())
}

#[tokio::test]
async fn test_notice_actions_require_admin() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let user = member("김동문", "85학번");

    let notice_draft = NoticeDraft {
        title: "이사회 안내".to_string(),
        content: "<p>이사회가 열립니다</p>".to_string(),
        notice_type: NoticeType::Event,
        is_important: false,
    };

    let err = store.add_notice(&user, notice_draft.clone()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);

    let notice = store.add_notice(&admin(), notice_draft)?;
    assert_eq!(notice.author, "관리자");
    assert!(store.is_user_generated(PostRef::notice(notice.id))?);
    assert!(!store.is_user_generated(PostRef::notice(1))?);

    assert!(matches!(store.delete_notice(&admin(), 1), Err(AppError::Forbidden)));
    assert!(matches!(store.delete_notice(&admin(), 999), Err(AppError::NotFound(_))));
    assert!(matches!(store.delete_notice(&user, notice.id), Err(AppError::Forbidden)));

    store.delete_notice(&admin(), notice.id)?;
    assert!(store.notice(notice.id)?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_seed_notice_edit_survives_reopen() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let original = store.notice(1)?.expect("seed notice 1");

    let rename = NoticeUpdate {
        title: Some("정기총회 일정 변경".to_string()),
        ..Default::default()
    };

    let err = store.update_notice(&member("김동문", "85학번"), 1, rename.clone()).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(store.notice(1)?.expect("seed notice 1").title, original.title);

    let updated = store.update_notice(&admin(), 1, rename)?;
    assert_eq!(updated.title, "정기총회 일정 변경");
    assert_eq!(updated.content, original.content);
    store.flush().await?;

    assert_eq!(storage.keys_with_prefix("seedNotices").await, vec!["seedNotices".to_string()]);
    assert!(storage.keys_with_prefix("tempNotices").await.is_empty());

    let reopened = open(&storage).await?;
    let notice = reopened.notice(1)?.expect("seed notice 1 after reopen");
    assert_eq!(notice.title, "정기총회 일정 변경");
    assert!(!reopened.is_user_generated(PostRef::notice(1))?);

    let blank = NoticeUpdate {
        title: Some("   ".to_string()),
        ..Default::default()
    };
    let err = reopened.update_notice(&admin(), 1, blank).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);
    assert_eq!(reopened.notice(1)?.expect("seed notice 1").title, "정기총회 일정 변경");

    Ok(())
}

#[tokio::test]
async fn test_post_ownership_rules() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let owner = member("김동문", "85학번");
    let namesake = member("김동문", "90학번");

    let post = store.add_post(&owner, draft("모임 제안"))?;

    let update = PostUpdate {
        title: Some("모임 제안 (수정)".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        store.update_post(&namesake, post.id, update.clone()),
        Err(AppError::Forbidden)
    ));

    let updated = store.update_post(&owner, post.id, update)?;
    assert_eq!(updated.title, "모임 제안 (수정)");
    assert_eq!(updated.category, Category::Meetups);

    assert!(matches!(store.delete_post(&namesake, post.id), Err(AppError::Forbidden)));
    assert!(matches!(store.delete_post(&admin(), 1), Err(AppError::Forbidden)));
    store.delete_post(&admin(), post.id)?;
    assert!(store.post(post.id)?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_deleting_post_drops_its_comments() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let user = member("김동문", "85학번");

    let post = store.add_post(&user, draft("댓글 달린 글"))?;
    store.add_comment(&user, PostRef::post(post.id), "첫 댓글")?;
    store.add_comment(&admin(), PostRef::post(post.id), "관리자 댓글")?;
    store.flush().await?;

    let key = format!("comments:post:{}", post.id);
    assert_eq!(storage.keys_with_prefix(&key).await.len(), 1);

    store.delete_post(&user, post.id)?;
    store.flush().await?;

    assert!(store.comments_for(PostRef::post(post.id))?.is_empty());
    assert!(storage.keys_with_prefix(&key).await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_comments_do_not_cross_kinds() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let user = member("김동문", "85학번");

    store.add_comment(&user, PostRef::post(5), "게시글 댓글")?;
    store.add_comment(&user, PostRef::notice(5), "공지 댓글")?;

    let on_post = store.comments_for(PostRef::post(5))?;
    assert_eq!(on_post.len(), 1);
    assert_eq!(on_post[0].content, "게시글 댓글");
    assert_eq!(on_post[0].post_type, PostKind::Post);

    let on_notice = store.comments_for(PostRef::notice(5))?;
    assert_eq!(on_notice.len(), 1);
    assert_eq!(on_notice[0].content, "공지 댓글");

    let err = store.add_comment(&user, PostRef::post(5), "   ").unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationError);

    let other = member("이동문", "78학번");
    assert!(matches!(store.delete_comment(&other, on_post[0].id), Err(AppError::Forbidden)));
    store.delete_comment(&user, on_post[0].id)?;
    assert!(store.comments_for(PostRef::post(5))?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_views_count_once_per_window() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let base = store.post(1)?.map(|p| p.views).unwrap_or_default();
    let t0 = 1_700_000_000_000;

    let first = store.record_view_at(PostRef::post(1), t0).await?;
    assert!(first.counted);
    assert_eq!(first.views, base + 1);

    let again = store.record_view_at(PostRef::post(1), t0 + 60_000).await?;
    assert!(!again.counted);
    assert_eq!(again.views, base + 1);

    let boundary = store.record_view_at(PostRef::post(1), t0 + VIEW_WINDOW_MS).await?;
    assert!(!boundary.counted);

    let next_day = store.record_view_at(PostRef::post(1), t0 + VIEW_WINDOW_MS + 1).await?;
    assert!(next_day.counted);
    assert_eq!(next_day.views, base + 2);
    store.flush().await?;

    // Seed counters and markers both persist.
    let reopened = open(&storage).await?;
    assert_eq!(reopened.post(1)?.map(|p| p.views), Some(base + 2));
    let after = reopened
        .record_view_at(PostRef::post(1), t0 + VIEW_WINDOW_MS + 2)
        .await?;
    assert!(!after.counted);

    let missing = store.record_view_at(PostRef::notice(404), t0).await.unwrap_err();
    assert_eq!(missing.code(), ErrorCode::NotFound);

    Ok(())
}

#[tokio::test]
async fn test_write_is_sanitized_and_validated() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let user = member("김동문", "85학번");
    let before = store.revision();

    let post = store.add_post(
        &user,
        PostDraft {
            title: "  안녕하세요  ".to_string(),
            content: "<script>alert(1)</script><p>반갑습니다</p>".to_string(),
            category: Category::Other,
        },
    )?;
    assert_eq!(post.title, "안녕하세요");
    assert_eq!(post.content, "<p>반갑습니다</p>");

    let blank = store.add_post(&user, draft("   ")).unwrap_err();
    assert_eq!(blank.code(), ErrorCode::ValidationError);

    let script_only = PostDraft {
        title: "제목".to_string(),
        content: "<script>x</script>".to_string(),
        category: Category::Other,
    };
    assert!(store.add_post(&user, script_only).is_err());

    assert_eq!(store.user_posts()?.len(), 1);
    assert_eq!(store.revision(), before + 1);

    Ok(())
}

#[tokio::test]
async fn test_pinning_moves_entry_first() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let store = open(&storage).await?;
    let user = member("김동문", "85학번");

    store.add_post(&user, draft("최신 글"))?;
    assert!(matches!(store.toggle_pin_post(&user, 1), Err(AppError::Forbidden)));

    let pinned = store.toggle_pin_post(&admin(), 1)?;
    assert!(pinned.is_pinned);

    let ordered = sort_for_display(store.posts()?);
    assert_eq!(ordered[0].id, 1);

    let notice = store.toggle_pin_notice(&admin(), 3)?;
    assert!(notice.is_pinned);
    assert_eq!(sort_for_display(store.notices()?)[0].id, 3);

    let unpinned = store.toggle_pin_post(&admin(), 1)?;
    assert!(!unpinned.is_pinned);

    Ok(())
}

#[tokio::test]
async fn test_failed_mirror_write_surfaces_on_flush() -> anyhow::Result<()> {
    let backend = Arc::new(MemoryKeyValueStore::with_quota(4_000));
    let storage = JsonStorage::new(backend);
    let store = open(&storage).await?;
    let user = member("김동문", "85학번");

    let kept = store.add_post(&user, draft("짧은 글"))?;
    store.flush().await?;

    let big = PostDraft {
        title: "긴 글".to_string(),
        content: format!("<p>{}</p>", "가".repeat(5_000)),
        category: Category::Other,
    };
    let oversized = store.add_post(&user, big)?;
    assert!(store.post(oversized.id)?.is_some());

    let err = store.flush().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::StorageQuotaExceeded);

    // Storage still holds the last good list; reload converges on it.
    store.reload().await?;
    let ids: Vec<i64> = store.user_posts()?.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![kept.id]);

    store.flush().await?;
    Ok(())
}

#[tokio::test]
async fn test_other_context_changes_are_picked_up() -> anyhow::Result<()> {
    let storage = JsonStorage::new(Arc::new(MemoryKeyValueStore::new()));
    let writer = open(&storage).await?;
    let reader = Arc::new(open(&storage.fork()).await?);
    let _watch = reader.watch_storage();
    let mut revisions = reader.subscribe();

    let post = writer.add_post(&member("김동문", "85학번"), draft("다른 탭에서"))?;
    writer.flush().await?;

    tokio::time::timeout(Duration::from_secs(5), revisions.changed()).await??;
    assert!(reader.post(post.id)?.is_some());

    Ok(())
}
