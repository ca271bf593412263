//! Read queries for articles, categories, and FAQs. Thin pass-throughs over
//! the content port; every failure degrades to an empty result with a
//! logged warning, because a broken query must never take the page down
//! with it.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use domains::models::{Category, Post, PostFaq, PostFilter};
use domains::traits::ContentStore;

pub struct ContentService {
    store: Arc<dyn ContentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    pub async fn categories(&self) -> Vec<Category> {
        match self.store.list_categories().await {
            Ok(categories) => categories,
            Err(cause) => {
                warn!(error = %cause, "category fetch failed");
                Vec::new()
            }
        }
    }

    pub async fn category_by_slug(&self, slug: &str) -> Option<Category> {
        match self.store.category_by_slug(slug).await {
            Ok(category) => category,
            Err(cause) => {
                warn!(slug, error = %cause, "category fetch failed");
                None
            }
        }
    }

    pub async fn posts(&self, filter: PostFilter) -> Vec<Post> {
        match self.store.list_posts(filter).await {
            Ok(posts) => posts,
            Err(cause) => {
                warn!(error = %cause, "post listing failed");
                Vec::new()
            }
        }
    }

    /// Published post addressed by `category-slug/post-slug`, the way the
    /// article pages are routed.
    pub async fn post_by_slug(&self, category_slug: &str, post_slug: &str) -> Option<Post> {
        match self.store.post_by_slug(category_slug, post_slug).await {
            Ok(post) => post,
            Err(cause) => {
                warn!(category_slug, post_slug, error = %cause, "post fetch failed");
                None
            }
        }
    }

    pub async fn related_posts(
        &self,
        category_id: Uuid,
        exclude_id: Uuid,
        limit: i64,
    ) -> Vec<Post> {
        match self
            .store
            .related_posts(category_id, exclude_id, limit)
            .await
        {
            Ok(posts) => posts,
            Err(cause) => {
                warn!(%category_id, error = %cause, "related posts fetch failed");
                Vec::new()
            }
        }
    }

    pub async fn faqs_for_post(&self, post_id: Uuid) -> Vec<PostFaq> {
        match self.store.faqs_for_post(post_id).await {
            Ok(faqs) => faqs,
            Err(cause) => {
                warn!(%post_id, error = %cause, "faq fetch failed");
                Vec::new()
            }
        }
    }
}
