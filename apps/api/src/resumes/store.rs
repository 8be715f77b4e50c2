use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resume::ResumeRow;

/// Read access to stored resume text, the only thing matching needs.
#[async_trait]
pub trait ResumeLookup: Send + Sync {
    /// Extracted text of the resume, or `None` when no such resume exists.
    async fn resume_content(&self, id: Uuid) -> Result<Option<String>>;
}

#[async_trait]
impl ResumeLookup for PgPool {
    async fn resume_content(&self, id: Uuid) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT content FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(self)
            .await?;
        Ok(row.map(|(content,)| content))
    }
}

/// Returns resumes newest first.
pub async fn list_resumes(pool: &PgPool) -> Result<Vec<ResumeRow>> {
    Ok(
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?,
    )
}

pub async fn insert_resume(
    pool: &PgPool,
    name: &str,
    file_path: &str,
    content: &str,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO resumes (id, name, file_path, content) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(name)
        .bind(file_path)
        .bind(content)
        .execute(pool)
        .await?;
    Ok(id)
}
