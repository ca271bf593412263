//! In-memory implementation of the storage ports, backed by `DashMap`.
//! Used by the test suites and by local development without a database.
//! Mirrors the external store's contract: atomic inserts, id assignment,
//! referential check on `post_id`, rows orderable by `created_at`.

use anyhow::bail;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use domains::models::{Category, Comment, NewComment, Post, PostFaq, PostFilter};
use domains::moderation::CommentStatus;
use domains::traits::{CommentStore, ContentStore};

#[derive(Default)]
pub struct MemoryStore {
    categories: DashMap<Uuid, Category>,
    posts: DashMap<Uuid, Post>,
    faqs: DashMap<Uuid, PostFaq>,
    comments: DashMap<Uuid, Comment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_category(&self, category: Category) {
        self.categories.insert(category.id, category);
    }

    pub fn add_post(&self, post: Post) {
        self.posts.insert(post.id, post);
    }

    pub fn add_faq(&self, faq: PostFaq) {
        self.faqs.insert(faq.id, faq);
    }

    /// Seeds a fully-formed comment row, bypassing the submission path.
    /// Test/dev seeding only.
    pub fn add_comment(&self, comment: Comment) {
        self.comments.insert(comment.id, comment);
    }

    /// Stands in for the external moderation tool: applies one transition,
    /// enforcing the lifecycle contract, and stamps `approved_at` on
    /// approval.
    pub fn moderate(&self, id: Uuid, next: CommentStatus) -> anyhow::Result<()> {
        let Some(mut comment) = self.comments.get_mut(&id) else {
            bail!("comment {id} does not exist");
        };
        if !comment.status.can_become(next) {
            bail!("illegal status transition {} -> {}", comment.status, next);
        }
        comment.status = next;
        if next == CommentStatus::Approved {
            comment.approved_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Every stored comment regardless of status. Test inspection only.
    pub fn all_comments(&self) -> Vec<Comment> {
        let mut rows: Vec<Comment> = self.comments.iter().map(|e| e.value().clone()).collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        rows
    }

    fn category_id_for_slug(&self, slug: &str) -> Option<Uuid> {
        self.categories
            .iter()
            .find(|e| e.value().slug == slug)
            .map(|e| *e.key())
    }

    fn with_category(&self, mut post: Post) -> Post {
        post.category = self
            .categories
            .get(&post.category_id)
            .map(|c| c.value().clone());
        post
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn insert(&self, comment: NewComment) -> anyhow::Result<()> {
        if !self.posts.contains_key(&comment.post_id) {
            bail!("post {} does not exist", comment.post_id);
        }
        let id = Uuid::now_v7();
        self.comments.insert(
            id,
            Comment {
                id,
                post_id: comment.post_id,
                parent_id: comment.parent_id,
                author_name: comment.author_name,
                author_email: comment.author_email,
                content: comment.content,
                status: comment.status,
                user_agent: comment.user_agent,
                created_at: comment.created_at,
                approved_at: None,
                replies: Vec::new(),
            },
        );
        Ok(())
    }

    async fn list_by_status(
        &self,
        post_id: Uuid,
        status: CommentStatus,
    ) -> anyhow::Result<Vec<Comment>> {
        let mut rows: Vec<Comment> = self
            .comments
            .iter()
            .filter(|e| e.value().post_id == post_id && e.value().status == status)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(rows)
    }

    async fn count_by_status(
        &self,
        post_id: Uuid,
        status: CommentStatus,
    ) -> anyhow::Result<u64> {
        Ok(self
            .comments
            .iter()
            .filter(|e| e.value().post_id == post_id && e.value().status == status)
            .count() as u64)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let mut rows: Vec<Category> = self.categories.iter().map(|e| e.value().clone()).collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn category_by_slug(&self, slug: &str) -> anyhow::Result<Option<Category>> {
        Ok(self
            .categories
            .iter()
            .find(|e| e.value().slug == slug)
            .map(|e| e.value().clone()))
    }

    async fn list_posts(&self, filter: PostFilter) -> anyhow::Result<Vec<Post>> {
        let category_id = match &filter.category_slug {
            Some(slug) => match self.category_id_for_slug(slug) {
                Some(id) => Some(id),
                // Unknown category slug yields no posts, not an error.
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let mut rows: Vec<Post> = self
            .posts
            .iter()
            .map(|e| e.value().clone())
            .filter(|p| !filter.published || p.published)
            .filter(|p| filter.featured.map_or(true, |f| p.featured == f))
            .filter(|p| category_id.map_or(true, |id| p.category_id == id))
            .filter(|p| filter.exclude_id.map_or(true, |id| p.id != id))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rows
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|p| self.with_category(p))
            .collect())
    }

    async fn post_by_slug(
        &self,
        category_slug: &str,
        post_slug: &str,
    ) -> anyhow::Result<Option<Post>> {
        let Some(category_id) = self.category_id_for_slug(category_slug) else {
            return Ok(None);
        };
        Ok(self
            .posts
            .iter()
            .find(|e| {
                let p = e.value();
                p.slug == post_slug && p.category_id == category_id && p.published
            })
            .map(|e| self.with_category(e.value().clone())))
    }

    async fn related_posts(
        &self,
        category_id: Uuid,
        exclude_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<Post>> {
        let mut rows: Vec<Post> = self
            .posts
            .iter()
            .map(|e| e.value().clone())
            .filter(|p| p.category_id == category_id && p.published && p.id != exclude_id)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .take(limit.max(0) as usize)
            .map(|p| self.with_category(p))
            .collect())
    }

    async fn faqs_for_post(&self, post_id: Uuid) -> anyhow::Result<Vec<PostFaq>> {
        let mut rows: Vec<PostFaq> = self
            .faqs
            .iter()
            .filter(|e| e.value().post_id == post_id)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
        Ok(rows)
    }
}
