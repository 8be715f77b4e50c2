//! Axum route handlers for job discovery.

use axum::{
    extract::{Query, State},
    response::Html,
    Form, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::jobs::feed::{fetch_all, fetch_feed, parse_keywords, FeedEntry, MAX_ENTRIES_TOTAL};
use crate::models::job_posting::JobPostingRow;
use crate::state::AppState;
use crate::views;

#[derive(Debug, Deserialize)]
pub struct RssQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RssResponse {
    pub jobs: Vec<FeedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ScrapeForm {
    pub feed_url: String,
    #[serde(default)]
    pub keywords: String,
}

/// GET /api/jobs/rss?url=
///
/// Fetches one feed when `url` is given, otherwise every configured default feed.
pub async fn handle_fetch_rss(
    State(state): State<AppState>,
    Query(params): Query<RssQuery>,
) -> Result<Json<RssResponse>, AppError> {
    let jobs = match params.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => {
            validate_feed_url(url)?;
            fetch_feed(&state.http, url, MAX_ENTRIES_TOTAL)
                .await
                .map_err(|e| AppError::Feed(format!("{url}: {e}")))?
        }
        None => fetch_all(&state.http, &state.config.job_feed_urls).await,
    };

    Ok(Json(RssResponse { jobs }))
}

/// GET /jobs/scrape
pub async fn handle_scrape_page() -> Html<String> {
    views::scraper_page()
}

/// POST /jobs/scrape
///
/// Fetches a feed, keeps entries matching any keyword, stores them as job postings,
/// and returns the result cards fragment.
pub async fn handle_scrape(
    State(state): State<AppState>,
    Form(form): Form<ScrapeForm>,
) -> Result<Html<String>, AppError> {
    let feed_url = form.feed_url.trim();
    validate_feed_url(feed_url)?;

    let entries = fetch_feed(&state.http, feed_url, MAX_ENTRIES_TOTAL)
        .await
        .map_err(|e| AppError::Feed(format!("{feed_url}: {e}")))?;

    let keywords = parse_keywords(&form.keywords);
    let mut postings = Vec::new();
    for entry in entries.iter().filter(|e| e.matches_any(&keywords)) {
        postings.push(save_posting(&state.db, entry).await?);
    }

    info!(
        "Scraped {feed_url}: {} entries, {} matched keywords {:?}",
        entries.len(),
        postings.len(),
        keywords
    );

    Ok(views::scraped_jobs(&postings))
}

async fn save_posting(pool: &PgPool, entry: &FeedEntry) -> Result<JobPostingRow, AppError> {
    let title = if entry.title.is_empty() {
        "Untitled job"
    } else {
        entry.title.as_str()
    };

    let row = sqlx::query_as::<_, JobPostingRow>(
        r#"
        INSERT INTO job_postings
            (id, title, company, location, description, url, source, published_at)
        VALUES ($1, $2, '', '', $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(title)
    .bind(&entry.summary)
    .bind(&entry.link)
    .bind(&entry.source)
    .bind(entry.published_at().unwrap_or_else(Utc::now))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

fn validate_feed_url(url: &str) -> Result<(), AppError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "feed_url must be an http(s) URL, got '{url}'"
        )))
    }
}
