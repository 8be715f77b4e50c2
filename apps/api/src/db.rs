use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS applications (
        id           UUID PRIMARY KEY,
        title        TEXT NOT NULL,
        company      TEXT NOT NULL,
        location     TEXT NOT NULL DEFAULT '',
        description  TEXT NOT NULL DEFAULT '',
        url          TEXT NOT NULL DEFAULT '',
        status       TEXT NOT NULL DEFAULT 'saved',
        applied_date TIMESTAMPTZ,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id         UUID PRIMARY KEY,
        name       TEXT NOT NULL,
        file_path  TEXT NOT NULL,
        content    TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS contacts (
        id       UUID PRIMARY KEY,
        name     TEXT NOT NULL,
        email    TEXT NOT NULL DEFAULT '',
        phone    TEXT NOT NULL DEFAULT '',
        company  TEXT NOT NULL DEFAULT '',
        position TEXT NOT NULL DEFAULT '',
        notes    TEXT NOT NULL DEFAULT ''
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_postings (
        id           UUID PRIMARY KEY,
        title        TEXT NOT NULL,
        company      TEXT NOT NULL DEFAULT '',
        location     TEXT NOT NULL DEFAULT '',
        description  TEXT NOT NULL DEFAULT '',
        url          TEXT NOT NULL DEFAULT '',
        source       TEXT NOT NULL DEFAULT '',
        published_at TIMESTAMPTZ NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates all tables if they do not exist yet.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready ({} tables)", SCHEMA.len());
    Ok(())
}
