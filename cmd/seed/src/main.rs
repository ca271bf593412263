//! Seeds the database with sample content for local development.
//! Safe to run repeatedly: rows are keyed on slugs or fixed ids and
//! duplicate inserts are skipped.

use anyhow::Context;
use chrono::{Duration, Utc};
use secrecy::ExposeSecret;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = configs::load().context("loading configuration")?;
    let db = cfg
        .database
        .as_ref()
        .context("database configuration is required to seed (set DATABASE_URL)")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(db.url.expose_secret())
        .await
        .context("connecting to Postgres")?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    let maquininhas = upsert_category(
        &pool,
        "Maquininhas",
        "maquininhas",
        "Comparativos e análises de maquininhas de cartão",
    )
    .await?;
    let taxas = upsert_category(
        &pool,
        "Taxas",
        "taxas",
        "Taxas, antecipação e custo por venda",
    )
    .await?;

    let guide = upsert_post(
        &pool,
        maquininhas,
        "Melhores maquininhas de 2026",
        "melhores-maquininhas-2026",
        "guia",
        true,
    )
    .await?;
    upsert_post(
        &pool,
        taxas,
        "Como calcular a taxa por venda",
        "como-calcular-taxa-por-venda",
        "artigo",
        false,
    )
    .await?;

    upsert_faq(
        &pool,
        Uuid::from_u128(0x5EED_0001),
        guide,
        "A maquininha tem mensalidade?",
        "Não. Nenhuma das maquininhas comparadas neste guia cobra mensalidade.",
        0,
    )
    .await?;
    upsert_faq(
        &pool,
        Uuid::from_u128(0x5EED_0002),
        guide,
        "Em quanto tempo o dinheiro cai na conta?",
        "Depende do plano de recebimento: no mesmo dia ou em um dia útil.",
        1,
    )
    .await?;

    let parent = Uuid::from_u128(0x5EED_1001);
    upsert_comment(
        &pool,
        parent,
        guide,
        None,
        "Carlos",
        "Ótimo comparativo, me ajudou a escolher.",
        0,
    )
    .await?;
    upsert_comment(
        &pool,
        Uuid::from_u128(0x5EED_1002),
        guide,
        Some(parent),
        "Fernanda",
        "Concordo, a tabela de taxas foi o que fechou pra mim.",
        7,
    )
    .await?;

    println!("seed complete");
    Ok(())
}

async fn upsert_category(
    pool: &PgPool,
    name: &str,
    slug: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    sqlx::query(
        "INSERT INTO categories (id, name, slug, description) VALUES ($1, $2, $3, $4) \
         ON CONFLICT (slug) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .bind(name)
    .bind(slug)
    .bind(description)
    .execute(pool)
    .await?;

    let id: Uuid = sqlx::query_scalar("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn upsert_post(
    pool: &PgPool,
    category_id: Uuid,
    title: &str,
    slug: &str,
    kind: &str,
    featured: bool,
) -> anyhow::Result<Uuid> {
    sqlx::query(
        "INSERT INTO posts (id, title, slug, content, category_id, type, featured, published, published_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8) \
         ON CONFLICT (category_id, slug) DO NOTHING",
    )
    .bind(Uuid::now_v7())
    .bind(title)
    .bind(slug)
    .bind(format!("# {title}\n\nConteúdo de exemplo para desenvolvimento local."))
    .bind(category_id)
    .bind(kind)
    .bind(featured)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let id: Uuid = sqlx::query_scalar("SELECT id FROM posts WHERE category_id = $1 AND slug = $2")
        .bind(category_id)
        .bind(slug)
        .fetch_one(pool)
        .await?;
    Ok(id)
}

async fn upsert_faq(
    pool: &PgPool,
    id: Uuid,
    post_id: Uuid,
    question: &str,
    answer: &str,
    order: i32,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO post_faqs (id, post_id, question, answer, \"order\") \
         VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .bind(post_id)
    .bind(question)
    .bind(answer)
    .bind(order)
    .execute(pool)
    .await?;
    Ok(())
}

async fn upsert_comment(
    pool: &PgPool,
    id: Uuid,
    post_id: Uuid,
    parent_id: Option<Uuid>,
    author: &str,
    content: &str,
    minutes_ago_offset: i64,
) -> anyhow::Result<()> {
    let created_at = Utc::now() - Duration::minutes(60 - minutes_ago_offset);
    sqlx::query(
        "INSERT INTO comments \
         (id, post_id, parent_id, author_name, author_email, content, status, created_at, approved_at) \
         VALUES ($1, $2, $3, $4, $5, $6, 'approved', $7, $8) \
         ON CONFLICT (id) DO NOTHING",
    )
    .bind(id)
    .bind(post_id)
    .bind(parent_id)
    .bind(author)
    .bind(format!("{}@example.com", author.to_lowercase()))
    .bind(content)
    .bind(created_at)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(())
}
