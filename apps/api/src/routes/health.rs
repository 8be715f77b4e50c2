use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "JobHunter API is running"
    }))
}

/// GET /debug/database
/// Runs a trivial query and reports which database the pool points at.
pub async fn database_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    sqlx::query("SELECT 1").execute(&state.db).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Database connection successful",
        "database_url": truncate_url(&state.config.database_url),
    })))
}

const SHOWN_URL_CHARS: usize = 20;

/// Credentials hidden, then cut to a short prefix.
fn truncate_url(url: &str) -> String {
    let redacted = match url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.rsplit_once('@').map_or(rest, |(_, host)| host);
            format!("{scheme}://***@{host}")
        }
        None => "***".to_string(),
    };
    if redacted.chars().count() <= SHOWN_URL_CHARS {
        return redacted;
    }
    let prefix: String = redacted.chars().take(SHOWN_URL_CHARS).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_url_hides_credentials() {
        assert_eq!(
            truncate_url("postgres://user:secret@db:5432/jobs"),
            "postgres://***@db:54..."
        );
        assert_eq!(truncate_url("sqlite://a"), "sqlite://***@a");
        assert_eq!(truncate_url("not a url"), "***");
    }
}
