//! # Core Traits (Ports)
//!
//! Any storage adapter must implement these traits to be used by the
//! services. The external store owns atomicity of inserts and row ordering.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Category, Comment, NewComment, Post, PostFaq, PostFilter};
use crate::moderation::CommentStatus;

/// Persistence contract for the comment pipeline.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Writes one comment row as a single atomic insert. The store assigns
    /// the id and enforces that `post_id` references an existing post.
    async fn insert(&self, comment: NewComment) -> anyhow::Result<()>;

    /// Rows for one post in one status, ordered by ascending `created_at`,
    /// with `replies` left empty.
    async fn list_by_status(
        &self,
        post_id: Uuid,
        status: CommentStatus,
    ) -> anyhow::Result<Vec<Comment>>;

    async fn count_by_status(
        &self,
        post_id: Uuid,
        status: CommentStatus,
    ) -> anyhow::Result<u64>;
}

/// Read contract for articles, categories, and FAQs.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>>;

    async fn category_by_slug(&self, slug: &str) -> anyhow::Result<Option<Category>>;

    async fn list_posts(&self, filter: PostFilter) -> anyhow::Result<Vec<Post>>;

    /// Published post addressed by its category slug + post slug pair.
    async fn post_by_slug(
        &self,
        category_slug: &str,
        post_slug: &str,
    ) -> anyhow::Result<Option<Post>>;

    async fn related_posts(
        &self,
        category_id: Uuid,
        exclude_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<Post>>;

    async fn faqs_for_post(&self, post_id: Uuid) -> anyhow::Result<Vec<PostFaq>>;
}
