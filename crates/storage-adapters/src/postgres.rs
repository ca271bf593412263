//! Postgres implementation of the storage ports.
//!
//! This module maps between the relational model and the `domains` structs.
//! Referential integrity of `post_id` is enforced by the foreign key; a
//! violated constraint surfaces as a plain error the services report
//! generically.

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{QueryBuilder, Row};
use std::collections::HashMap;
use uuid::Uuid;

use domains::models::{Category, Comment, NewComment, Post, PostFaq, PostFilter, PostKind};
use domains::moderation::CommentStatus;
use domains::traits::{CommentStore, ContentStore};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .context("connecting to Postgres")?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn categories_by_id(&self) -> anyhow::Result<HashMap<Uuid, Category>> {
        let rows = sqlx::query(
            "SELECT id, name, slug, description, emoji, color, created_at FROM categories",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let category = row_to_category(&row);
                (category.id, category)
            })
            .collect())
    }
}

fn row_to_category(row: &PgRow) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        emoji: row.get("emoji"),
        color: row.get("color"),
        created_at: row.get("created_at"),
    }
}

fn row_to_comment(row: &PgRow) -> anyhow::Result<Comment> {
    let status: String = row.get("status");
    Ok(Comment {
        id: row.get("id"),
        post_id: row.get("post_id"),
        parent_id: row.get("parent_id"),
        author_name: row.get("author_name"),
        author_email: row.get("author_email"),
        content: row.get("content"),
        status: status.parse::<CommentStatus>()?,
        user_agent: row.get("user_agent"),
        created_at: row.get("created_at"),
        approved_at: row.get("approved_at"),
        replies: Vec::new(),
    })
}

fn row_to_post(row: &PgRow) -> anyhow::Result<Post> {
    let kind: String = row.get("type");
    Ok(Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        content: row.get("content"),
        category_id: row.get("category_id"),
        category: None,
        featured_image: row.get("featured_image"),
        featured_image_alt: row.get("featured_image_alt"),
        meta_title: row.get("meta_title"),
        meta_description: row.get("meta_description"),
        kind: kind.parse::<PostKind>()?,
        featured: row.get("featured"),
        published: row.get("published"),
        views: row.get("views"),
        reading_time: row.get("reading_time"),
        tldr: row.get("tldr"),
        published_at: row.get("published_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

const POST_COLUMNS: &str = "id, title, slug, description, content, category_id, \
     featured_image, featured_image_alt, meta_title, meta_description, type, \
     featured, published, views, reading_time, tldr, published_at, created_at, updated_at";

#[async_trait]
impl CommentStore for PgStore {
    /// Single atomic insert; the row id is assigned here, at the storage
    /// layer.
    async fn insert(&self, comment: NewComment) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO comments \
             (id, post_id, parent_id, author_name, author_email, content, status, user_agent, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(Uuid::now_v7())
        .bind(comment.post_id)
        .bind(comment.parent_id)
        .bind(comment.author_name)
        .bind(comment.author_email)
        .bind(comment.content)
        .bind(comment.status.as_str())
        .bind(comment.user_agent)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_by_status(
        &self,
        post_id: Uuid,
        status: CommentStatus,
    ) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, post_id, parent_id, author_name, author_email, content, \
             status, user_agent, created_at, approved_at \
             FROM comments WHERE post_id = $1 AND status = $2 \
             ORDER BY created_at ASC",
        )
        .bind(post_id)
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_comment).collect()
    }

    async fn count_by_status(
        &self,
        post_id: Uuid,
        status: CommentStatus,
    ) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM comments WHERE post_id = $1 AND status = $2",
        )
        .bind(post_id)
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn list_categories(&self) -> anyhow::Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, slug, description, emoji, color, created_at \
             FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn category_by_slug(&self, slug: &str) -> anyhow::Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, slug, description, emoji, color, created_at \
             FROM categories WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(row_to_category))
    }

    async fn list_posts(&self, filter: PostFilter) -> anyhow::Result<Vec<Post>> {
        let mut qb: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {POST_COLUMNS} FROM posts WHERE 1=1"));
        if filter.published {
            qb.push(" AND published = TRUE");
        }
        if let Some(featured) = filter.featured {
            qb.push(" AND featured = ");
            qb.push_bind(featured);
        }
        if let Some(slug) = &filter.category_slug {
            // An unknown slug makes the subquery NULL, which matches no rows.
            qb.push(" AND category_id = (SELECT id FROM categories WHERE slug = ");
            qb.push_bind(slug.clone());
            qb.push(")");
        }
        if let Some(exclude) = filter.exclude_id {
            qb.push(" AND id <> ");
            qb.push_bind(exclude);
        }
        qb.push(" ORDER BY created_at DESC LIMIT ");
        qb.push_bind(filter.limit);
        qb.push(" OFFSET ");
        qb.push_bind(filter.offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut posts = rows
            .iter()
            .map(row_to_post)
            .collect::<anyhow::Result<Vec<Post>>>()?;

        let categories = self.categories_by_id().await?;
        for post in &mut posts {
            post.category = categories.get(&post.category_id).cloned();
        }
        Ok(posts)
    }

    async fn post_by_slug(
        &self,
        category_slug: &str,
        post_slug: &str,
    ) -> anyhow::Result<Option<Post>> {
        let Some(category) = self.category_by_slug(category_slug).await? else {
            return Ok(None);
        };

        let row = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE slug = $1 AND category_id = $2 AND published = TRUE"
        ))
        .bind(post_slug)
        .bind(category.id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut post = row_to_post(&row)?;
                post.category = Some(category);
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    async fn related_posts(
        &self,
        category_id: Uuid,
        exclude_id: Uuid,
        limit: i64,
    ) -> anyhow::Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE category_id = $1 AND published = TRUE AND id <> $2 \
             ORDER BY created_at DESC LIMIT $3"
        ))
        .bind(category_id)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut posts = rows
            .iter()
            .map(row_to_post)
            .collect::<anyhow::Result<Vec<Post>>>()?;
        let categories = self.categories_by_id().await?;
        for post in &mut posts {
            post.category = categories.get(&post.category_id).cloned();
        }
        Ok(posts)
    }

    async fn faqs_for_post(&self, post_id: Uuid) -> anyhow::Result<Vec<PostFaq>> {
        let rows = sqlx::query(
            "SELECT id, post_id, question, answer, \"order\", created_at \
             FROM post_faqs WHERE post_id = $1 \
             ORDER BY \"order\" ASC, created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| PostFaq {
                id: row.get("id"),
                post_id: row.get("post_id"),
                question: row.get("question"),
                answer: row.get("answer"),
                order: row.get("order"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
