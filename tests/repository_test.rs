use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dongmun::{
    domain::{
        Comment, DuesPlan, DuesPledge, Member, MemberRole, PostKind, PostRef, Region, StudentType,
    },
    repository::{
        CommentRepository, DuesRepository, JsonCommentRepository, JsonDuesRepository,
        JsonMemberRepository, JsonNoticeRepository, JsonPostRepository, JsonViewMarkerRepository,
        MemberRepository, NoticeRepository, PostRepository, ViewMarkerRepository,
    },
    domain::seed,
    storage::{JsonStorage, MemoryKeyValueStore},
};

fn storage() -> JsonStorage {
    JsonStorage::new(Arc::new(MemoryKeyValueStore::new()))
}

fn comment(id: i64, target: PostRef) -> Comment {
    Comment {
        id,
        author: "김동문".to_string(),
        grade: "85학번".to_string(),
        content: format!("comment {}", id),
        date: "2024.12.01".to_string(),
        post_id: target.id,
        post_type: target.kind,
    }
}

fn member(id: i64, email: &str) -> Member {
    Member {
        id,
        email: email.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        name: format!("member {}", id),
        student_type: StudentType::Graduate,
        birth_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
        grade: "90학번".to_string(),
        role: MemberRole::User,
        is_active: true,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_notices_prepend_and_remove() -> anyhow::Result<()> {
    let repo = JsonNoticeRepository::new(storage());
    assert!(repo.load_all().await.is_empty());

    let mut notices = seed::seed_notices();
    let second = notices.remove(1);
    let first = notices.remove(0);

    repo.add(first.clone()).await?;
    repo.add(second.clone()).await?;

    let ids: Vec<i64> = repo.load_all().await.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    repo.remove(second.id).await?;
    let ids: Vec<i64> = repo.load_all().await.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![first.id]);

    Ok(())
}

#[tokio::test]
async fn test_posts_round_trip_camel_case() -> anyhow::Result<()> {
    let storage = storage();
    let repo = JsonPostRepository::new(storage.clone());

    let post = seed::seed_posts().remove(0);
    repo.add(post.clone()).await?;

    let raw: serde_json::Value = storage.get("tempPosts", serde_json::Value::Null).await;
    assert_eq!(raw[0]["isPinned"], serde_json::Value::Bool(false));
    assert_eq!(raw[0]["category"], "동기회");

    assert_eq!(repo.load_all().await, vec![post]);
    Ok(())
}

#[tokio::test]
async fn test_comments_are_namespaced_by_kind() -> anyhow::Result<()> {
    let repo = JsonCommentRepository::new(storage());

    repo.add(PostRef::post(5), comment(1, PostRef::post(5))).await?;
    repo.add(PostRef::post(5), comment(2, PostRef::post(5))).await?;
    repo.add(PostRef::notice(5), comment(3, PostRef::notice(5))).await?;

    let on_post: Vec<i64> = repo.load(PostRef::post(5)).await.iter().map(|c| c.id).collect();
    assert_eq!(on_post, vec![1, 2]);

    let on_notice = repo.load(PostRef::notice(5)).await;
    assert_eq!(on_notice.len(), 1);
    assert_eq!(on_notice[0].post_type, PostKind::Notice);

    repo.remove(PostRef::post(5), 1).await?;
    assert_eq!(repo.load(PostRef::post(5)).await.len(), 1);

    repo.remove_all(PostRef::notice(5)).await?;
    assert!(repo.load(PostRef::notice(5)).await.is_empty());
    assert_eq!(repo.load_everything().await.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_member_lookup_and_status() -> anyhow::Result<()> {
    let repo = JsonMemberRepository::new(storage());

    repo.add(member(10, "Kim@Example.com")).await?;
    repo.add(member(11, "lee@example.com")).await?;

    let found = repo.find_by_email("kim@example.com").await;
    assert_eq!(found.map(|m| m.id), Some(10));
    assert!(repo.find_by_email("park@example.com").await.is_none());

    let updated = repo.update_status(11, false).await?;
    assert!(!updated.is_active);
    assert!(repo.update_status(99, false).await.is_err());

    repo.remove(10).await?;
    let ids: Vec<i64> = repo.load_all().await.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![11]);

    Ok(())
}

#[tokio::test]
async fn test_dues_and_view_markers() -> anyhow::Result<()> {
    let storage = storage();
    let dues = JsonDuesRepository::new(storage.clone());

    dues.add(DuesPledge {
        id: 1,
        member_id: 2,
        region: Region::Seoul,
        amount: 100_000,
        plan: DuesPlan::OneTime,
        is_active: true,
        created_at: Utc::now(),
    })
    .await?;

    let raw: serde_json::Value = storage.get("duesPledges", serde_json::Value::Null).await;
    assert_eq!(raw[0]["region"], "재경");
    assert_eq!(raw[0]["plan"], "일회성");
    assert_eq!(dues.load_all().await.len(), 1);

    let markers = JsonViewMarkerRepository::new(storage.clone());
    assert_eq!(markers.last_view(PostKind::Post, 3).await, None);
    markers.mark_viewed(PostKind::Post, 3, 1_700_000_000_000).await?;
    assert_eq!(markers.last_view(PostKind::Post, 3).await, Some(1_700_000_000_000));
    assert_eq!(markers.last_view(PostKind::Notice, 3).await, None);

    Ok(())
}
