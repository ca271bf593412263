//! # maqblog binary
//!
//! Assembles the blog backend: configuration, storage adapter, services,
//! and the axum router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use api_adapters::metrics::ApiMetrics;
use api_adapters::state::AppState;
use configs::AppConfig;
use domains::traits::{CommentStore, ContentStore};
use services::content::ContentService;
use services::submission::{SubmissionLimits, SubmissionService};
use services::thread::ThreadService;

#[cfg(feature = "db-postgres")]
use secrecy::ExposeSecret;
#[cfg(feature = "db-postgres")]
use storage_adapters::PgStore;

#[cfg(not(feature = "db-postgres"))]
use storage_adapters::MemoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = configs::load().context("loading configuration")?;
    let (comment_store, content_store) = build_stores(&cfg).await?;

    let metrics = Arc::new(ApiMetrics::new());
    let submissions = SubmissionService::new(
        comment_store.clone(),
        Duration::from_secs(cfg.comments.cooldown_secs),
        SubmissionLimits {
            author_name_max: cfg.comments.author_name_max,
            content_max: cfg.comments.content_max,
        },
    )
    .with_recorder(metrics.clone());

    let state = Arc::new(AppState {
        submissions,
        threads: ThreadService::new(comment_store),
        content: ContentService::new(content_store),
        metrics,
    });

    let app = api_adapters::router(state);
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .context("invalid server address")?;
    tracing::info!(%addr, "maqblog backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("binding listener")?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

#[cfg(feature = "db-postgres")]
async fn build_stores(
    cfg: &AppConfig,
) -> anyhow::Result<(Arc<dyn CommentStore>, Arc<dyn ContentStore>)> {
    let db = cfg
        .database
        .as_ref()
        .context("database configuration is required (set DATABASE_URL)")?;
    let store = Arc::new(
        PgStore::connect(db.url.expose_secret(), db.max_connections).await?,
    );
    sqlx::migrate!("../../migrations")
        .run(store.pool())
        .await
        .context("running migrations")?;
    Ok((store.clone(), store))
}

#[cfg(not(feature = "db-postgres"))]
async fn build_stores(
    _cfg: &AppConfig,
) -> anyhow::Result<(Arc<dyn CommentStore>, Arc<dyn ContentStore>)> {
    tracing::warn!("running with the in-memory store; nothing survives a restart");
    let store = Arc::new(MemoryStore::new());
    Ok((store.clone(), store))
}
