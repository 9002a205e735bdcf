//! Pure derived views over store snapshots: ordering, filtering, paging and
//! search. Nothing here touches storage.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::domain::{
    Category, CommunityPost, Entity, Filter, Member, MemberFilter, Notice, NoticeType, PostKind,
};

/// Title shown for activity rows whose post no longer exists.
pub const MISSING_TITLE: &str = "게시글을 찾을 수 없습니다";

pub const DEFAULT_PAGE_SIZE: usize = 3;

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*>"#).expect("valid img pattern")
});

static IMG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<img[^>]*>").expect("valid img pattern"));

/// Fields a list search looks at.
pub trait Searchable {
    fn title(&self) -> &str;
    fn content(&self) -> &str;
    fn author(&self) -> &str;
    fn grade(&self) -> Option<&str> {
        None
    }
}

impl Searchable for Notice {
    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Searchable for CommunityPost {
    fn title(&self) -> &str {
        &self.title
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn author(&self) -> &str {
        &self.author
    }

    fn grade(&self) -> Option<&str> {
        Some(&self.grade)
    }
}

/// Pinned entries first, then newest id first. Ids grow with creation
/// time, so this is also reverse chronological.
pub fn sort_for_display<T: Entity>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| {
        b.is_pinned()
            .cmp(&a.is_pinned())
            .then_with(|| b.id().cmp(&a.id()))
    });
    items
}

pub fn filter_by_search<T: Searchable>(items: Vec<T>, term: &str) -> Vec<T> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| {
            item.title().to_lowercase().contains(&term)
                || strip_html(item.content()).to_lowercase().contains(&term)
                || item.author().to_lowercase().contains(&term)
                || item.grade().is_some_and(|g| g.to_lowercase().contains(&term))
        })
        .collect()
}

pub fn filter_by_category(posts: Vec<CommunityPost>, category: &Filter<Category>) -> Vec<CommunityPost> {
    posts.into_iter().filter(|p| category.matches(&p.category)).collect()
}

pub fn filter_by_notice_type(notices: Vec<Notice>, notice_type: &Filter<NoticeType>) -> Vec<Notice> {
    notices.into_iter().filter(|n| notice_type.matches(&n.notice_type)).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Slices out a 1-based page. Out-of-range pages clamp to the nearest
/// valid one and an empty list still has one (empty) page.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let current_page = page.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((current_page - 1) * page_size)
        .take(page_size)
        .collect();

    Page {
        items,
        current_page,
        total_pages,
        total_items,
        page_size,
        has_next: current_page < total_pages,
        has_prev: current_page > 1,
    }
}

/// Entries either side of one detail page, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation<T> {
    /// The entry listed just above, i.e. newer or pinned.
    pub prev: Option<T>,
    pub next: Option<T>,
    /// 1-based; `None` when the id is not in the list.
    pub position: Option<usize>,
    pub total: usize,
}

/// Previous and next entries around `id` after [`sort_for_display`].
/// Both ends, and an unknown id, yield `None`.
pub fn neighbors<T: Entity + Clone>(items: &[T], id: i64) -> Navigation<T> {
    let ordered = sort_for_display(items.to_vec());
    let total = ordered.len();

    let Some(index) = ordered.iter().position(|item| item.id() == id) else {
        return Navigation { prev: None, next: None, position: None, total };
    };

    Navigation {
        prev: index.checked_sub(1).and_then(|i| ordered.get(i)).cloned(),
        next: ordered.get(index + 1).cloned(),
        position: Some(index + 1),
        total,
    }
}

/// Plain text of an HTML fragment, for previews and search.
pub fn strip_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    TAG.replace_all(html, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// `src` of the first `<img>` in the fragment, used as a list thumbnail.
pub fn first_image_src(html: &str) -> Option<String> {
    IMG_SRC
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn has_image(html: &str) -> bool {
    IMG.is_match(html)
}

pub fn filter_members(members: Vec<Member>, filter: &MemberFilter) -> Vec<Member> {
    let term = filter.search.trim().to_lowercase();

    members
        .into_iter()
        .filter(|m| {
            term.is_empty()
                || m.name.to_lowercase().contains(&term)
                || m.email.to_lowercase().contains(&term)
                || m.grade.to_lowercase().contains(&term)
        })
        .filter(|m| filter.student_type.matches(&m.student_type))
        .filter(|m| filter.role.matches(&m.role))
        .collect()
}

/// One row of the site-wide search.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: i64,
    pub kind: PostKind,
    pub title: String,
    /// Content with markup removed.
    pub content: String,
    pub author: String,
    pub date: String,
    pub is_important: bool,
    pub category: Option<Category>,
    pub grade: Option<String>,
}

/// Title or content match across notices and posts. Important notices
/// come first, everything else newest first. A blank query finds nothing.
pub fn global_search(notices: &[Notice], posts: &[CommunityPost], query: &str) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit> = Vec::new();

    for notice in notices {
        let content = strip_html(&notice.content);
        if notice.title.to_lowercase().contains(&query) || content.to_lowercase().contains(&query) {
            hits.push(SearchHit {
                id: notice.id,
                kind: PostKind::Notice,
                title: notice.title.clone(),
                content,
                author: notice.author.clone(),
                date: notice.date.clone(),
                is_important: notice.is_important,
                category: None,
                grade: None,
            });
        }
    }

    for post in posts {
        let content = strip_html(&post.content);
        if post.title.to_lowercase().contains(&query) || content.to_lowercase().contains(&query) {
            hits.push(SearchHit {
                id: post.id,
                kind: PostKind::Post,
                title: post.title.clone(),
                content,
                author: post.author.clone(),
                date: post.date.clone(),
                is_important: false,
                category: Some(post.category),
                grade: Some(post.grade.clone()),
            });
        }
    }

    hits.sort_by(|a, b| {
        let a_top = a.kind == PostKind::Notice && a.is_important;
        let b_top = b.kind == PostKind::Notice && b.is_important;
        b_top.cmp(&a_top).then_with(|| b.id.cmp(&a.id))
    });
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_decodes_entities() {
        assert_eq!(strip_html("<p>a &amp; b&nbsp;&lt;c&gt;</p>"), "a & b <c>");
        assert_eq!(strip_html("<b>&quot;hi&#39;</b>  "), "\"hi'");
        assert_eq!(strip_html(""), "");
    }

    #[test]
    fn test_double_escaped_entity_decodes_once() {
        assert_eq!(strip_html("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_first_image_src() {
        let html = r#"<p>x</p><IMG class="a" src='/img/1.png'><img src="/img/2.png">"#;
        assert_eq!(first_image_src(html).as_deref(), Some("/img/1.png"));
        assert!(has_image(html));
        assert_eq!(first_image_src("<p>none</p>"), None);
        assert!(!has_image("<p>none</p>"));
    }

    #[test]
    fn test_paginate_empty_has_one_page() {
        let page = paginate(Vec::<i32>::new(), 4, 0);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.page_size, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next && !page.has_prev);
    }
}
