pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::contacts::handlers as contacts;
use crate::jobs::handlers as jobs;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/debug/database", get(health::database_handler))
        // Pages and htmx partials
        .route("/", get(applications::handle_dashboard))
        .route("/applications", get(applications::handle_list_partial))
        .route(
            "/applications-page",
            get(applications::handle_applications_page),
        )
        .route("/applications/create", post(applications::handle_create))
        .route("/resumes", get(resumes::handle_resume_manager))
        .route("/resumes/optimize", post(resumes::handle_optimize))
        .route(
            "/jobs/scrape",
            get(jobs::handle_scrape_page).post(jobs::handle_scrape),
        )
        // JSON API
        .route(
            "/api/applications/:id/status",
            patch(applications::handle_update_status),
        )
        .route(
            "/api/applications/:id/cover-letter",
            post(applications::handle_cover_letter),
        )
        .route("/api/upload-resume", post(resumes::handle_upload))
        .route("/api/resumes", get(resumes::handle_list_resumes))
        .route("/api/resumes/match", post(resumes::handle_match))
        .route("/api/jobs/rss", get(jobs::handle_fetch_rss))
        .route(
            "/api/contacts",
            get(contacts::handle_list_contacts).post(contacts::handle_create_contact),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_match_with_inline_resume_text() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(post_json(
                "/api/resumes/match",
                r#"{"resume_text": "Python developer with Docker experience",
                    "job_description": "Python developer needed. Docker, Kubernetes required."}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["method"], "local");
        assert_eq!(body["score"], 50);
        assert_eq!(
            body["missing"],
            serde_json::json!(["needed", "kubernetes", "required"])
        );
    }

    #[tokio::test]
    async fn test_match_with_vocabulary_and_null_job() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(post_json(
                "/api/resumes/match",
                r#"{"resume_text": "I write Go", "job_description": null, "vocabulary": [" Go ", "Rust", "go"]}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["score"], 50);
        assert_eq!(body["included"], serde_json::json!(["go"]));
    }

    #[tokio::test]
    async fn test_match_treats_non_text_fields_as_empty() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(post_json(
                "/api/resumes/match",
                r#"{"resume_text": "Python", "job_description": 42}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["score"], 0);
        assert_eq!(body["keywords"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_match_requires_resume() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(post_json(
                "/api/resumes/match",
                r#"{"job_description": "Python"}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = build_router(AppState::for_tests());
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
