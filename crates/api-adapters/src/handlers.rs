//! Request handlers coordinating between HTTP and the services.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domains::error::AppError;
use domains::models::{Category, Comment, Post, PostFaq, PostFilter};
use services::submission::{CommentDraft, SubmissionAck};

use crate::error::ApiError;
use crate::state::AppState;

/// Rendering view of a comment. The author email never leaves the server.
#[derive(Debug, Serialize)]
pub struct PublicComment {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<PublicComment>,
}

impl From<Comment> for PublicComment {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            parent_id: comment.parent_id,
            author_name: comment.author_name,
            content: comment.content,
            created_at: comment.created_at,
            replies: comment
                .replies
                .into_iter()
                .map(PublicComment::from)
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentCount {
    pub count: u64,
}

/// The cooldown keys off the peer address; a proxy's `x-forwarded-for`
/// wins when present.
fn client_key(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

pub async fn submit_comment(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(draft): Json<CommentDraft>,
) -> Result<Json<SubmissionAck>, ApiError> {
    let client = client_key(&headers, addr);
    let ack = state.submissions.submit(&client, draft).await?;
    Ok(Json(ack))
}

pub async fn post_comments(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> Json<Vec<PublicComment>> {
    let tree = state.threads.comments_for_post(post_id).await;
    Json(tree.into_iter().map(PublicComment::from).collect())
}

pub async fn post_comment_count(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> Json<CommentCount> {
    Json(CommentCount {
        count: state.threads.comment_count(post_id).await,
    })
}

pub async fn post_faqs(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<Uuid>,
) -> Json<Vec<PostFaq>> {
    Json(state.content.faqs_for_post(post_id).await)
}

#[derive(Debug, Default, Deserialize)]
pub struct PostsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub exclude: Option<Uuid>,
}

pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostsQuery>,
) -> Json<Vec<Post>> {
    let filter = PostFilter {
        limit: query.limit.unwrap_or(20).clamp(1, 100),
        offset: query.offset.unwrap_or(0).max(0),
        category_slug: query.category,
        featured: query.featured,
        published: true,
        exclude_id: query.exclude,
    };
    Json(state.content.posts(filter).await)
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub category_id: Uuid,
    pub exclude: Uuid,
    pub limit: Option<i64>,
}

pub async fn related_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RelatedQuery>,
) -> Json<Vec<Post>> {
    let limit = query.limit.unwrap_or(3).clamp(1, 20);
    Json(
        state
            .content
            .related_posts(query.category_id, query.exclude, limit)
            .await,
    )
}

pub async fn post_by_slug(
    State(state): State<Arc<AppState>>,
    Path((category, slug)): Path<(String, String)>,
) -> Result<Json<Post>, ApiError> {
    match state.content.post_by_slug(&category, &slug).await {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError(AppError::NotFound(
            "post".into(),
            format!("{category}/{slug}"),
        ))),
    }
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<Category>> {
    Json(state.content.categories().await)
}

pub async fn export_metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        state.metrics.encode_text(),
    )
}
