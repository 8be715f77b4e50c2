//! Cover letters: template writer, plus an LLM writer that falls back to the template.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::LlmClient;
use crate::models::application::ApplicationRow;

const MAX_DESCRIPTION_CHARS: usize = 1000;

const COVER_LETTER_SYSTEM: &str = "You write concise, professional cover letters. \
    Reply with the letter text only, no preamble.";

fn cover_letter_prompt(title: &str, company: &str, description: &str) -> String {
    format!(
        "Write a professional cover letter for this job application:

Position: {title}
Company: {company}
Job Description: {description}

Write a compelling cover letter that highlights relevant experience
and shows enthusiasm for the role. Keep it professional and concise."
    )
}

#[async_trait]
pub trait CoverLetterWriter: Send + Sync {
    async fn write(&self, application: &ApplicationRow) -> String;
}

/// Deterministic letter with placeholders for the applicant to fill in.
pub struct TemplateCoverLetter;

#[async_trait]
impl CoverLetterWriter for TemplateCoverLetter {
    async fn write(&self, application: &ApplicationRow) -> String {
        render_template(&application.title, &application.company)
    }
}

pub struct LlmCoverLetter(pub LlmClient);

#[async_trait]
impl CoverLetterWriter for LlmCoverLetter {
    async fn write(&self, application: &ApplicationRow) -> String {
        let description: String = application
            .description
            .chars()
            .take(MAX_DESCRIPTION_CHARS)
            .collect();
        let prompt = cover_letter_prompt(&application.title, &application.company, &description);

        match self.0.call_text(&prompt, COVER_LETTER_SYSTEM).await {
            Ok(letter) => letter,
            Err(e) => {
                warn!("LLM cover letter failed ({e}); using template");
                render_template(&application.title, &application.company)
            }
        }
    }
}

pub fn build_cover_letter_writer(llm: Option<&LlmClient>) -> Arc<dyn CoverLetterWriter> {
    match llm {
        Some(llm) => {
            info!("Cover letters: LLM with template fallback");
            Arc::new(LlmCoverLetter(llm.clone()))
        }
        None => {
            info!("Cover letters: template");
            Arc::new(TemplateCoverLetter)
        }
    }
}

fn render_template(title: &str, company: &str) -> String {
    format!(
        "Dear Hiring Manager,

I am writing to express my interest in the {title} position at {company}. \
With my background and experience, I believe I would be a valuable asset to your team.

[Your specific qualifications and enthusiasm for the role]

Thank you for considering my application. I look forward to the opportunity to discuss \
how I can contribute to {company}'s success.

Sincerely,
[Your Name]"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn application() -> ApplicationRow {
        ApplicationRow {
            id: Uuid::new_v4(),
            title: "Backend Engineer".to_string(),
            company: "Startup Inc".to_string(),
            location: "New York".to_string(),
            description: "Build scalable backend systems.".to_string(),
            url: "https://example.com/jobs/2".to_string(),
            status: "applied".to_string(),
            applied_date: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_template_mentions_title_and_company() {
        let letter = TemplateCoverLetter.write(&application()).await;
        assert!(letter.starts_with("Dear Hiring Manager,"));
        assert!(letter.contains("Backend Engineer position at Startup Inc"));
        assert!(letter.contains("Startup Inc's success"));
    }

    #[test]
    fn test_prompt_fields_are_not_rescanned() {
        let prompt = cover_letter_prompt("{company} Lead", "Acme", "Ship {title} fast");
        assert!(prompt.contains("Position: {company} Lead"));
        assert!(prompt.contains("Company: Acme"));
        assert!(prompt.contains("Job Description: Ship {title} fast"));
    }
}
