use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An uploaded resume. `file_path` is the object-storage key; `content` is the extracted text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub name: String,
    pub file_path: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
