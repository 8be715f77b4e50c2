//! Axum route handlers for applications.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applications::store::{
    get_application, get_job_posting, insert_applied, list_applications, update_status,
    NewApplication,
};
use crate::errors::AppError;
use crate::jobs::feed::web_link;
use crate::models::application::{ApplicationRow, ApplicationStatus};
use crate::models::job_posting::JobPostingRow;
use crate::state::AppState;
use crate::views;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

/// Form posted by "Save & Apply" buttons and the manual entry form.
#[derive(Debug, Default, Deserialize)]
pub struct CreateApplicationForm {
    pub job_id: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct CoverLetterResponse {
    pub application_id: Uuid,
    pub cover_letter: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_dashboard(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let applications = list_applications(&state.db, None).await?;
    Ok(views::dashboard(&applications))
}

/// GET /applications?status=
///
/// Table partial for htmx. An empty `status` means no filter.
pub async fn handle_list_partial(
    State(state): State<AppState>,
    Query(params): Query<StatusQuery>,
) -> Result<Html<String>, AppError> {
    let status = parse_status_filter(params.status.as_deref())?;
    let applications = list_applications(&state.db, status).await?;
    Ok(views::applications_table(&applications))
}

/// GET /applications-page
pub async fn handle_applications_page(
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let applications = list_applications(&state.db, None).await?;
    Ok(views::applications_page(&applications))
}

/// POST /applications/create
///
/// Creates an `applied` application, copying fields from the job posting named by
/// `job_id` when one exists. Returns the refreshed table partial.
pub async fn handle_create(
    State(state): State<AppState>,
    Form(form): Form<CreateApplicationForm>,
) -> Result<Html<String>, AppError> {
    let posting = match form.job_id.as_deref().and_then(|id| Uuid::parse_str(id.trim()).ok()) {
        Some(id) => get_job_posting(&state.db, id).await?,
        None => None,
    };

    let new = resolve_new_application(&form, posting.as_ref());
    let created = insert_applied(&state.db, &new).await?;
    info!("Created application {} ({} @ {})", created.id, created.title, created.company);

    let applications = list_applications(&state.db, None).await?;
    Ok(views::applications_table(&applications))
}

/// PATCH /api/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let status = request
        .status
        .parse::<ApplicationStatus>()
        .map_err(AppError::Validation)?;

    let updated = update_status(&state.db, id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    Ok(Json(updated))
}

/// POST /api/applications/:id/cover-letter
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CoverLetterResponse>, AppError> {
    let application = get_application(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))?;

    let cover_letter = state.cover_letters.write(&application).await;

    Ok(Json(CoverLetterResponse {
        application_id: id,
        cover_letter,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn parse_status_filter(raw: Option<&str>) -> Result<Option<ApplicationStatus>, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse().map(Some).map_err(AppError::Validation),
        None => Ok(None),
    }
}

/// Posting fields win; form fields fill in when there is no posting.
fn resolve_new_application(
    form: &CreateApplicationForm,
    posting: Option<&JobPostingRow>,
) -> NewApplication {
    if let Some(p) = posting {
        return NewApplication {
            title: p.title.clone(),
            company: p.company.clone(),
            location: p.location.clone(),
            description: p.description.clone(),
            url: web_link(&p.url),
        };
    }

    let field = |v: &Option<String>| v.as_deref().map(str::trim).unwrap_or_default().to_string();
    let job_id = form.job_id.as_deref().map(str::trim).unwrap_or("manual");
    let title = field(&form.title);

    NewApplication {
        title: if title.is_empty() {
            format!("Job {job_id}")
        } else {
            title
        },
        company: field(&form.company),
        location: field(&form.location),
        description: field(&form.description),
        url: web_link(&field(&form.url)),
    }
}
