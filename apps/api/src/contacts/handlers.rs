//! Axum route handlers for recruiter and referral contacts.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::contact::ContactRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub notes: String,
}

/// GET /api/contacts
pub async fn handle_list_contacts(
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactRow>>, AppError> {
    let contacts = sqlx::query_as::<_, ContactRow>("SELECT * FROM contacts ORDER BY name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(contacts))
}

/// POST /api/contacts
pub async fn handle_create_contact(
    State(state): State<AppState>,
    Json(request): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactRow>), AppError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let contact = sqlx::query_as::<_, ContactRow>(
        r#"
        INSERT INTO contacts (id, name, email, phone, company, position, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(request.email.trim())
    .bind(request.phone.trim())
    .bind(request.company.trim())
    .bind(request.position.trim())
    .bind(&request.notes)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(contact)))
}
