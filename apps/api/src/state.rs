use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::cover_letter::CoverLetterWriter;
use crate::matching::scorer::MatchScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Object storage for uploaded resume files.
    pub s3: S3Client,
    /// HTTP client for job feeds.
    pub http: reqwest::Client,
    pub config: Config,
    /// Local or enriched, selected at startup.
    pub match_scorer: Arc<dyn MatchScorer>,
    pub cover_letters: Arc<dyn CoverLetterWriter>,
}

#[cfg(test)]
impl AppState {
    /// State whose pool never connects until a query runs.
    pub fn for_tests() -> Self {
        use aws_sdk_s3::config::{BehaviorVersion, Region};
        use sqlx::postgres::PgPoolOptions;

        use crate::cover_letter::TemplateCoverLetter;
        use crate::matching::scorer::LocalScorer;

        let config = Config::for_tests();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .expect("lazy pool");
        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();

        AppState {
            db,
            s3: S3Client::from_conf(s3_config),
            http: reqwest::Client::new(),
            config,
            match_scorer: Arc::new(LocalScorer::default()),
            cover_letters: Arc::new(TemplateCoverLetter),
        }
    }
}
