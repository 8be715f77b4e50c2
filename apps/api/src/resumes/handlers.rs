//! Axum route handlers for resumes: upload, listing and job matching.

use axum::{
    extract::{Multipart, State},
    response::Html,
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::default_score_options;
use crate::matching::scorer::{MatchResult, MatchScorer, ScoreOptions};
use crate::resumes::store::{insert_resume, list_resumes, ResumeLookup};
use crate::resumes::upload::{extract_text, storage_key, store_file, ResumeFormat};
use crate::state::AppState;
use crate::views;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: String,
    pub message: String,
    pub filename: String,
    pub saved_as: String,
    pub resume_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub name: String,
    pub filename: String,
    pub upload_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeSummary>,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeForm {
    pub resume_id: String,
    pub job_description: Option<String>,
}

/// JSON match request. A text field that is present but `null` or not a string scores as
/// empty text; `None` means the field was omitted.
#[derive(Debug, Default, Deserialize)]
pub struct MatchRequest {
    pub resume_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub resume_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_description: Option<String>,
    pub vocabulary: Option<Vec<String>>,
    pub min_keyword_length: Option<usize>,
    pub max_suggestions: Option<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /resumes
pub async fn handle_resume_manager(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let resumes = list_resumes(&state.db).await?;
    Ok(views::resumes_page(&resumes))
}

/// POST /api/upload-resume
///
/// Multipart fields: `file`, `candidate_name`, `candidate_email`.
/// Stores the file, extracts its text and records a resume row.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut candidate_name = String::new();
    let mut candidate_email = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file: {e}")))?;
                file = Some((filename, bytes.to_vec()));
            }
            "candidate_name" | "candidate_email" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read {name}: {e}")))?;
                if name == "candidate_name" {
                    candidate_name = value.trim().to_string();
                } else {
                    candidate_email = value.trim().to_string();
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or_else(|| AppError::Validation("file is required".to_string()))?;
    if candidate_name.is_empty() || candidate_email.is_empty() {
        return Err(AppError::Validation(
            "candidate_name and candidate_email are required".to_string(),
        ));
    }
    let format = ResumeFormat::from_filename(&filename).ok_or_else(|| {
        AppError::Validation("Only PDF, DOC, and DOCX files allowed".to_string())
    })?;

    let key = storage_key(&candidate_email, &filename);

    // pdf-extract is CPU bound and may panic on malformed input
    let extract_input = bytes.clone();
    let content = match tokio::task::spawn_blocking(move || extract_text(format, &extract_input)).await {
        Ok(text) => text,
        Err(e) => {
            warn!("Text extraction for {key} aborted: {e}");
            String::new()
        }
    };

    store_file(&state.s3, &state.config.s3_bucket, &key, format, bytes).await?;

    let resume_id = insert_resume(&state.db, &candidate_name, &key, &content).await?;

    info!(
        "Uploaded resume {resume_id} for {candidate_name} ({} chars extracted)",
        content.chars().count()
    );

    Ok(Json(UploadResponse {
        status: "success".to_string(),
        message: "Resume uploaded successfully".to_string(),
        filename,
        saved_as: key,
        resume_id,
    }))
}

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = list_resumes(&state.db)
        .await?
        .into_iter()
        .map(|r| ResumeSummary {
            id: r.id,
            filename: r
                .file_path
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string(),
            name: r.name,
            upload_time: r.created_at,
        })
        .collect();

    Ok(Json(ResumeListResponse { resumes }))
}

/// POST /resumes/optimize
///
/// Scores a stored resume against a pasted job description and returns the HTML fragment.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Form(form): Form<OptimizeForm>,
) -> Result<Html<String>, AppError> {
    let resume_id = Uuid::parse_str(form.resume_id.trim())
        .map_err(|_| AppError::Validation(format!("Invalid resume_id '{}'", form.resume_id)))?;
    let resume_text = require_resume_content(&state.db, resume_id).await?;

    let job_text = form.job_description.unwrap_or_default();
    let options = default_score_options(&state.config);
    let result = state
        .match_scorer
        .score(&resume_text, &job_text, &options)
        .await;

    info!(
        "Resume {resume_id} scored {} via {}",
        result.score,
        result.method.as_str()
    );

    Ok(views::match_result(&result))
}

/// POST /api/resumes/match
///
/// JSON variant of optimize. Accepts a stored `resume_id` or inline `resume_text`.
pub async fn handle_match(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<MatchResult>, AppError> {
    let defaults = default_score_options(&state.config);
    let result = score_match_request(state.match_scorer.as_ref(), &state.db, defaults, request).await?;
    Ok(Json(result))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Resolves the resume text, then scores. An unknown `resume_id` fails before any scoring.
async fn score_match_request(
    scorer: &dyn MatchScorer,
    resumes: &dyn ResumeLookup,
    defaults: ScoreOptions,
    request: MatchRequest,
) -> Result<MatchResult, AppError> {
    let resume_text = match (request.resume_id, request.resume_text.as_ref()) {
        (Some(id), _) => require_resume_content(resumes, id).await?,
        (None, Some(text)) => text.clone(),
        (None, None) => {
            return Err(AppError::Validation(
                "Either resume_id or resume_text is required".to_string(),
            ))
        }
    };

    let options = merge_options(defaults, &request);
    let job_text = request.job_description.as_deref().unwrap_or_default();
    Ok(scorer.score(&resume_text, job_text, &options).await)
}

async fn require_resume_content(resumes: &dyn ResumeLookup, id: Uuid) -> Result<String, AppError> {
    resumes
        .resume_content(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Some(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    }))
}

/// Request overrides take precedence over configured defaults.
fn merge_options(defaults: ScoreOptions, request: &MatchRequest) -> ScoreOptions {
    ScoreOptions {
        vocabulary: request.vocabulary.clone(),
        min_keyword_length: request.min_keyword_length.unwrap_or(defaults.min_keyword_length),
        max_suggestions: request.max_suggestions.unwrap_or(defaults.max_suggestions),
    }
}
