//! # api-adapters
//!
//! The web routing and orchestration layer for the blog backend.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Builds the public router. Mounted at the root so the binary can place
/// it under a different prefix if the site layout ever changes.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/comments", post(handlers::submit_comment))
        .route("/api/posts", get(handlers::list_posts))
        .route("/api/posts/{post_id}/comments", get(handlers::post_comments))
        .route(
            "/api/posts/{post_id}/comments/count",
            get(handlers::post_comment_count),
        )
        .route("/api/posts/{post_id}/faqs", get(handlers::post_faqs))
        .route("/api/content/{category}/{slug}", get(handlers::post_by_slug))
        .route("/api/related-posts", get(handlers::related_posts))
        .route("/api/categories", get(handlers::list_categories))
        .route("/metrics", get(handlers::export_metrics))
        .with_state(state)
        .layer(middleware::cors_policy())
        .layer(middleware::trace_layer())
}
