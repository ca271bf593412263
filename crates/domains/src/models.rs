//! # Domain Models
//!
//! These structs represent the core entities of the blog backend.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::moderation::CommentStatus;

/// A visitor comment on an article.
///
/// `replies` is derived on every read by the thread builder and is never
/// persisted; stored rows always carry it empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// The owning article. Immutable after creation.
    pub post_id: Uuid,
    /// Another comment on the same post, or None for top-level comments.
    pub parent_id: Option<Uuid>,
    pub author_name: String,
    /// Stored for moderation contact only. The API layer strips this field
    /// before anything is rendered.
    pub author_email: String,
    pub content: String,
    pub status: CommentStatus,
    /// Diagnostic string, informational only.
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

/// Insert payload produced by the submission service. The storage layer
/// assigns the row id at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComment {
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub status: CommentStatus,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An article category (e.g. "Maquininhas", "Taxas").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Editorial classification of an article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    Gratuito,
    Guia,
    Artigo,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::Gratuito => "gratuito",
            PostKind::Guia => "guia",
            PostKind::Artigo => "artigo",
        }
    }
}

impl std::str::FromStr for PostKind {
    type Err = crate::error::ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gratuito" => Ok(PostKind::Gratuito),
            "guia" => Ok(PostKind::Guia),
            "artigo" => Ok(PostKind::Artigo),
            other => Err(crate::error::ParseEnumError::new("post kind", other)),
        }
    }
}

/// A blog article. Markdown-to-HTML conversion and page rendering happen
/// outside this backend; `content` is stored verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: String,
    pub category_id: Uuid,
    /// Joined on read when the caller needs it; not a stored column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub featured_image: Option<String>,
    pub featured_image_alt: Option<String>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(rename = "type")]
    pub kind: PostKind,
    pub featured: bool,
    pub published: bool,
    pub views: i32,
    pub reading_time: Option<i32>,
    /// TL;DR summary surfaced to LLM crawlers alongside the article.
    pub tldr: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One FAQ entry attached to an article, rendered as structured data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostFaq {
    pub id: Uuid,
    pub post_id: Uuid,
    pub question: String,
    pub answer: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing posts. Defaults mirror the public listing pages:
/// published only, newest first, twenty per page.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFilter {
    pub limit: i64,
    pub offset: i64,
    pub category_slug: Option<String>,
    pub featured: Option<bool>,
    pub published: bool,
    pub exclude_id: Option<Uuid>,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            category_slug: None,
            featured: None,
            published: true,
            exclude_id: None,
        }
    }
}
