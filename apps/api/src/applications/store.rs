use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::job_posting::JobPostingRow;

/// Field values for a new application row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub url: String,
}

/// Returns applications newest first, optionally filtered by status.
pub async fn list_applications(
    pool: &PgPool,
    status: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationRow>> {
    let rows = match status {
        Some(status) => {
            sqlx::query_as::<_, ApplicationRow>(
                "SELECT * FROM applications WHERE status = $1 ORDER BY created_at DESC",
            )
            .bind(status.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications ORDER BY created_at DESC")
                .fetch_all(pool)
                .await?
        }
    };
    Ok(rows)
}

pub async fn get_application(pool: &PgPool, id: Uuid) -> Result<Option<ApplicationRow>> {
    Ok(
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn get_job_posting(pool: &PgPool, id: Uuid) -> Result<Option<JobPostingRow>> {
    Ok(
        sqlx::query_as::<_, JobPostingRow>("SELECT * FROM job_postings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Inserts an application marked `applied` as of now.
pub async fn insert_applied(pool: &PgPool, new: &NewApplication) -> Result<ApplicationRow> {
    Ok(sqlx::query_as::<_, ApplicationRow>(
        r#"
        INSERT INTO applications
            (id, title, company, location, description, url, status, applied_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&new.title)
    .bind(&new.company)
    .bind(&new.location)
    .bind(&new.description)
    .bind(&new.url)
    .bind(ApplicationStatus::Applied.as_str())
    .bind(Utc::now())
    .fetch_one(pool)
    .await?)
}

/// Sets the status. Moving to `applied` stamps `applied_date` if it was never set.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: ApplicationStatus,
) -> Result<Option<ApplicationRow>> {
    Ok(sqlx::query_as::<_, ApplicationRow>(
        r#"
        UPDATE applications
        SET status = $2,
            applied_date = CASE
                WHEN $2 = 'applied' AND applied_date IS NULL THEN $3
                ELSE applied_date
            END
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?)
}
