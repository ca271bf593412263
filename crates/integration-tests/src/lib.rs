//! Shared fixtures for the integration test targets.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as Offset, TimeZone, Utc};
use uuid::Uuid;

use api_adapters::metrics::ApiMetrics;
use api_adapters::state::AppState;
use domains::models::{Category, Comment, Post, PostKind};
use domains::moderation::CommentStatus;
use services::content::ContentService;
use services::submission::{CommentDraft, SubmissionLimits, SubmissionService};
use services::thread::ThreadService;
use storage_adapters::MemoryStore;

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
}

pub fn uid(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

pub fn category(slug: &str) -> Category {
    Category {
        id: Uuid::now_v7(),
        name: slug.to_uppercase(),
        slug: slug.to_string(),
        description: None,
        emoji: Some("💳".to_string()),
        color: None,
        created_at: base_time(),
    }
}

pub fn post(category_id: Uuid, slug: &str, published: bool) -> Post {
    Post {
        id: Uuid::now_v7(),
        title: slug.replace('-', " "),
        slug: slug.to_string(),
        description: Some("descrição".into()),
        content: "# corpo\n\ntexto do artigo".into(),
        category_id,
        category: None,
        featured_image: None,
        featured_image_alt: None,
        meta_title: None,
        meta_description: None,
        kind: PostKind::Artigo,
        featured: false,
        published,
        views: 0,
        reading_time: Some(3),
        tldr: None,
        published_at: published.then(base_time),
        created_at: base_time(),
        updated_at: base_time(),
    }
}

pub fn comment_with_status(
    id: u128,
    post_id: Uuid,
    parent: Option<u128>,
    minute: i64,
    status: CommentStatus,
) -> Comment {
    Comment {
        id: uid(id),
        post_id,
        parent_id: parent.map(uid),
        author_name: format!("author-{id}"),
        author_email: format!("author-{id}@example.com"),
        content: format!("comment {id}"),
        status,
        user_agent: None,
        created_at: base_time() + Offset::minutes(minute),
        approved_at: (status == CommentStatus::Approved).then(base_time),
        replies: Vec::new(),
    }
}

pub fn approved_comment(id: u128, post_id: Uuid, parent: Option<u128>, minute: i64) -> Comment {
    comment_with_status(id, post_id, parent, minute, CommentStatus::Approved)
}

/// Memory store seeded with one category and one published post.
pub fn seeded_store() -> (Arc<MemoryStore>, Uuid) {
    let store = Arc::new(MemoryStore::new());
    let cat = category("maquininhas");
    let cat_id = cat.id;
    store.add_category(cat);
    let p = post(cat_id, "melhores-maquininhas-2026", true);
    let post_id = p.id;
    store.add_post(p);
    (store, post_id)
}

pub fn draft(post_id: Uuid) -> CommentDraft {
    CommentDraft {
        post_id,
        parent_id: None,
        author_name: "Maria Silva".into(),
        author_email: "maria@example.com".into(),
        content: "Qual a taxa no débito?".into(),
        user_agent: Some("integration-tests".into()),
        website: String::new(),
    }
}

pub fn submission_service(store: Arc<MemoryStore>, cooldown: Duration) -> SubmissionService {
    SubmissionService::new(store, cooldown, SubmissionLimits::default())
}

/// Full application state over the memory store, as the binary wires it.
pub fn app_state(store: Arc<MemoryStore>, cooldown: Duration) -> Arc<AppState> {
    let metrics = Arc::new(ApiMetrics::new());
    let submissions = SubmissionService::new(
        store.clone(),
        cooldown,
        SubmissionLimits::default(),
    )
    .with_recorder(metrics.clone());
    Arc::new(AppState {
        submissions,
        threads: ThreadService::new(store.clone()),
        content: ContentService::new(store),
        metrics,
    })
}
