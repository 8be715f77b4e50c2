//! Enriched scorer: asks an external analyzer for job keywords, then scores with the shared
//! substring matcher. Any analyzer fault degrades to `LocalScorer`.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::{LlmClient, LlmError};
use crate::matching::keywords::normalize_vocabulary;
use crate::matching::prompts::{match_analysis_prompt, MATCH_ANALYSIS_SYSTEM};
use crate::matching::scorer::{classify, LocalScorer, MatchResult, MatchScorer, ScoreOptions, ScoringMethod};

/// Characters of each document forwarded to the analyzer.
const MAX_ANALYZER_INPUT_CHARS: usize = 6000;

/// Structured output of an external keyword analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalAnalysis {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub analysis: String,
}

/// An external language-analysis backend.
#[async_trait]
pub trait KeywordAnalyzer: Send + Sync {
    async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<ExternalAnalysis, LlmError>;
}

#[async_trait]
impl KeywordAnalyzer for LlmClient {
    async fn analyze(&self, resume_text: &str, job_text: &str) -> Result<ExternalAnalysis, LlmError> {
        let prompt = match_analysis_prompt(
            truncate_chars(resume_text, MAX_ANALYZER_INPUT_CHARS),
            truncate_chars(job_text, MAX_ANALYZER_INPUT_CHARS),
        );
        self.call_json::<ExternalAnalysis>(&prompt, MATCH_ANALYSIS_SYSTEM)
            .await
    }
}

/// Scorer that enriches keyword discovery through a `KeywordAnalyzer`.
pub struct EnrichedScorer<A> {
    analyzer: A,
    fallback: LocalScorer,
    timeout: Duration,
}

impl<A: KeywordAnalyzer> EnrichedScorer<A> {
    pub fn new(analyzer: A, fallback: LocalScorer, timeout: Duration) -> Self {
        Self {
            analyzer,
            fallback,
            timeout,
        }
    }

    async fn try_enrich(
        &self,
        resume_text: &str,
        job_text: &str,
        options: &ScoreOptions,
    ) -> Result<MatchResult, String> {
        let analysis = tokio::time::timeout(self.timeout, self.analyzer.analyze(resume_text, job_text))
            .await
            .map_err(|_| format!("analyzer timed out after {}s", self.timeout.as_secs()))?
            .map_err(|e| e.to_string())?;

        let keywords = match &options.vocabulary {
            Some(vocabulary) => normalize_vocabulary(vocabulary),
            None => normalize_vocabulary(&analysis.keywords),
        };
        if keywords.is_empty() && options.vocabulary.is_none() {
            return Err("analyzer returned no keywords".to_string());
        }

        let mut result = classify(resume_text, keywords, options.max_suggestions, ScoringMethod::External);
        let analysis_text = analysis.analysis.trim();
        if !analysis_text.is_empty() {
            result.analysis = Some(analysis_text.to_string());
        }
        Ok(result)
    }
}

#[async_trait]
impl<A: KeywordAnalyzer> MatchScorer for EnrichedScorer<A> {
    async fn score(&self, resume_text: &str, job_text: &str, options: &ScoreOptions) -> MatchResult {
        if job_text.trim().is_empty() && options.vocabulary.is_none() {
            return self.fallback.score_sync(resume_text, job_text, options);
        }

        match self.try_enrich(resume_text, job_text, options).await {
            Ok(result) => {
                debug!("Enriched match scoring succeeded: score={}", result.score);
                result
            }
            Err(reason) => {
                warn!("Enriched match scoring unavailable ({reason}); using local scorer");
                self.fallback.score_sync(resume_text, job_text, options)
            }
        }
    }

    fn backend(&self) -> ScoringMethod {
        ScoringMethod::External
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedAnalyzer(Vec<&'static str>, &'static str);

    #[async_trait]
    impl KeywordAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _: &str, _: &str) -> Result<ExternalAnalysis, LlmError> {
            Ok(ExternalAnalysis {
                keywords: self.0.iter().map(|k| k.to_string()).collect(),
                analysis: self.1.to_string(),
            })
        }
    }

    struct FailingAnalyzer;

    #[async_trait]
    impl KeywordAnalyzer for FailingAnalyzer {
        async fn analyze(&self, _: &str, _: &str) -> Result<ExternalAnalysis, LlmError> {
            Err(LlmError::EmptyContent)
        }
    }

    struct SlowAnalyzer;

    #[async_trait]
    impl KeywordAnalyzer for SlowAnalyzer {
        async fn analyze(&self, _: &str, _: &str) -> Result<ExternalAnalysis, LlmError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(ExternalAnalysis {
                keywords: vec!["never".to_string()],
                analysis: String::new(),
            })
        }
    }

    #[derive(Default)]
    struct CountingAnalyzer(AtomicUsize);

    #[async_trait]
    impl KeywordAnalyzer for CountingAnalyzer {
        async fn analyze(&self, _: &str, _: &str) -> Result<ExternalAnalysis, LlmError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::EmptyContent)
        }
    }

    fn enriched<A: KeywordAnalyzer>(analyzer: A) -> EnrichedScorer<A> {
        EnrichedScorer::new(analyzer, LocalScorer::default(), Duration::from_secs(5))
    }

    const JOB: &str = "Looking for Kubernetes and Terraform experience";
    const RESUME: &str = "Operated Kubernetes clusters";

    #[tokio::test]
    async fn test_analyzer_keywords_are_used() {
        let scorer = enriched(FixedAnalyzer(vec!["Kubernetes", "terraform", "kubernetes"], "Emphasize IaC."));
        let result = scorer.score(RESUME, JOB, &ScoreOptions::default()).await;
        assert_eq!(result.method, ScoringMethod::External);
        assert_eq!(result.keywords, vec!["kubernetes", "terraform"]);
        assert_eq!(result.included, vec!["kubernetes"]);
        assert_eq!(result.score, 50);
        assert_eq!(result.analysis.as_deref(), Some("Emphasize IaC."));
    }

    #[tokio::test]
    async fn test_vocabulary_stays_authoritative() {
        let scorer = enriched(FixedAnalyzer(vec!["terraform"], "ok"));
        let options = ScoreOptions {
            vocabulary: Some(vec!["clusters".to_string()]),
            ..ScoreOptions::default()
        };
        let result = scorer.score(RESUME, JOB, &options).await;
        assert_eq!(result.method, ScoringMethod::External);
        assert_eq!(result.keywords, vec!["clusters"]);
        assert_eq!(result.score, 100);
    }

    #[tokio::test]
    async fn test_analyzer_error_falls_back_to_local() {
        let scorer = enriched(FailingAnalyzer);
        let options = ScoreOptions::default();
        let result = scorer.score(RESUME, JOB, &options).await;
        let expected = LocalScorer::default().score_sync(RESUME, JOB, &options);
        assert_eq!(result, expected);
        assert_eq!(result.method, ScoringMethod::Local);
    }

    #[tokio::test]
    async fn test_empty_analyzer_keywords_fall_back() {
        let scorer = enriched(FixedAnalyzer(vec!["  ", ""], "nothing useful"));
        let result = scorer.score(RESUME, JOB, &ScoreOptions::default()).await;
        assert_eq!(result.method, ScoringMethod::Local);
        assert!(result.analysis.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back_to_local() {
        let scorer = enriched(SlowAnalyzer);
        let result = scorer.score(RESUME, JOB, &ScoreOptions::default()).await;
        assert_eq!(result.method, ScoringMethod::Local);
        assert!(result.included.contains(&"kubernetes".to_string()));
    }

    #[tokio::test]
    async fn test_empty_job_skips_analyzer() {
        let scorer = enriched(CountingAnalyzer::default());
        let result = scorer.score(RESUME, "   ", &ScoreOptions::default()).await;
        assert_eq!(scorer.analyzer.0.load(Ordering::SeqCst), 0);
        assert_eq!(result.score, 0);
        assert_eq!(result.method, ScoringMethod::Local);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn test_backend_label() {
        assert_eq!(enriched(FailingAnalyzer).backend(), ScoringMethod::External);
    }
}
