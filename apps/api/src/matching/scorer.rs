//! Match scoring: trait-based scorer measuring keyword overlap between a resume and a job description.
//!
//! Default: `LocalScorer` (pure, synchronous core wrapped in the async trait).
//! Optional: `EnrichedScorer` (see `enriched.rs`), which falls back to the local path.
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, chosen once at startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::matching::keywords::{extract_keywords, normalize_vocabulary, KeywordSet, SeedTerms};

pub const DEFAULT_MIN_KEYWORD_LENGTH: usize = 4;
pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

const GOOD_MATCH_MESSAGE: &str = "Good keyword match!";
const SUGGESTION_PREFIX: &str = "Add these keywords to improve match: ";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Which backend produced a `MatchResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMethod {
    Local,
    External,
}

impl ScoringMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMethod::Local => "local",
            ScoringMethod::External => "external",
        }
    }
}

/// Per-call scoring options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreOptions {
    /// Authoritative keyword list. When `None`, keywords are extracted from the job text.
    pub vocabulary: Option<Vec<String>>,
    pub min_keyword_length: usize,
    pub max_suggestions: usize,
}

impl Default for ScoreOptions {
    fn default() -> Self {
        Self {
            vocabulary: None,
            min_keyword_length: DEFAULT_MIN_KEYWORD_LENGTH,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }
}

/// Result of scoring one resume against one job description.
///
/// `included` and `missing` partition `keywords`; all three keep discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub score: u8, // 0 – 100
    pub keywords: Vec<String>,
    pub included: Vec<String>,
    pub missing: Vec<String>,
    pub suggestions: String,
    pub method: ScoringMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Capability interface for match scoring. Implementations must never fail:
/// degraded backends report themselves through `MatchResult::method`.
#[async_trait]
pub trait MatchScorer: Send + Sync {
    async fn score(&self, resume_text: &str, job_text: &str, options: &ScoreOptions) -> MatchResult;

    /// Backend label for startup logging.
    fn backend(&self) -> ScoringMethod;
}

// ────────────────────────────────────────────────────────────────────────────
// LocalScorer
// ────────────────────────────────────────────────────────────────────────────

/// Pure keyword-overlap scorer. Deterministic, no I/O.
#[derive(Debug, Clone, Default)]
pub struct LocalScorer {
    seeds: SeedTerms,
}

impl LocalScorer {
    pub fn new(seeds: SeedTerms) -> Self {
        Self { seeds }
    }

    pub fn score_sync(&self, resume_text: &str, job_text: &str, options: &ScoreOptions) -> MatchResult {
        score_local(resume_text, job_text, options, &self.seeds)
    }
}

#[async_trait]
impl MatchScorer for LocalScorer {
    async fn score(&self, resume_text: &str, job_text: &str, options: &ScoreOptions) -> MatchResult {
        self.score_sync(resume_text, job_text, options)
    }

    fn backend(&self) -> ScoringMethod {
        ScoringMethod::Local
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

/// Scores `resume_text` against keywords from `options.vocabulary` or, failing that, `job_text`.
///
/// Algorithm:
/// 1. Keywords = normalized vocabulary, else tokens of job_text (len ≥ min or seed term)
/// 2. A keyword is included when it is a substring of the case-folded resume text
/// 3. score = round(100 × |included| / |keywords|), 0 when there are no keywords
pub fn score_local(
    resume_text: &str,
    job_text: &str,
    options: &ScoreOptions,
    seeds: &SeedTerms,
) -> MatchResult {
    let keywords = match &options.vocabulary {
        Some(vocabulary) => normalize_vocabulary(vocabulary),
        None => extract_keywords(job_text, options.min_keyword_length, seeds),
    };
    classify(resume_text, keywords, options.max_suggestions, ScoringMethod::Local)
}

/// Splits `keywords` into included/missing against the resume and builds the result.
/// Shared by every backend so matching semantics stay identical.
pub(crate) fn classify(
    resume_text: &str,
    keywords: KeywordSet,
    max_suggestions: usize,
    method: ScoringMethod,
) -> MatchResult {
    let resume_lower = resume_text.to_lowercase();

    let mut included = Vec::new();
    let mut missing = Vec::new();
    for keyword in keywords.iter() {
        // Substring, not token, match: "art" counts inside "starter".
        if resume_lower.contains(keyword) {
            included.push(keyword.to_string());
        } else {
            missing.push(keyword.to_string());
        }
    }

    let score = compute_score(included.len(), keywords.len());
    let suggestions = build_suggestions(&missing, max_suggestions);

    MatchResult {
        score,
        keywords: keywords.into_vec(),
        included,
        missing,
        suggestions,
        method,
        analysis: None,
    }
}

fn compute_score(included: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((included as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Builds the human-readable suggestion line from the first `max` missing keywords.
fn build_suggestions(missing: &[String], max: usize) -> String {
    if missing.is_empty() {
        return GOOD_MATCH_MESSAGE.to_string();
    }
    let top: Vec<&str> = missing.iter().take(max).map(String::as_str).collect();
    if top.is_empty() {
        return "Add missing keywords to improve match.".to_string();
    }
    format!("{SUGGESTION_PREFIX}{}", top.join(", "))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> ScoreOptions {
        ScoreOptions {
            vocabulary: Some(words.iter().map(|w| w.to_string()).collect()),
            ..ScoreOptions::default()
        }
    }

    fn local(resume: &str, job: &str, options: &ScoreOptions) -> MatchResult {
        score_local(resume, job, options, &SeedTerms::default())
    }

    fn assert_partition(result: &MatchResult) {
        let mut union: Vec<&String> = result.included.iter().chain(&result.missing).collect();
        union.sort();
        let mut keywords: Vec<&String> = result.keywords.iter().collect();
        keywords.sort();
        assert_eq!(union, keywords);
        assert!(result.included.iter().all(|k| !result.missing.contains(k)));
    }

    #[test]
    fn test_vocabulary_scenario_scores_33() {
        let result = local("Experienced Python engineer", "", &vocab(&["python", "docker", "aws"]));
        assert_eq!(result.included, vec!["python"]);
        assert_eq!(result.missing, vec!["docker", "aws"]);
        assert_eq!(result.score, 33);
        assert_eq!(result.method, ScoringMethod::Local);
        assert_partition(&result);
    }

    #[test]
    fn test_two_of_three_rounds_up() {
        let result = local("python and docker", "", &vocab(&["python", "docker", "aws"]));
        assert_eq!(result.score, 67);
    }

    #[test]
    fn test_case_insensitive_match() {
        let result = local("Python developer", "Need PYTHON skills", &ScoreOptions::default());
        assert!(result.included.contains(&"python".to_string()));
        assert!(result.missing.contains(&"need".to_string()));
        assert!(result.missing.contains(&"skills".to_string()));
        assert_partition(&result);
    }

    #[test]
    fn test_empty_job_text_without_vocabulary() {
        let result = local("Anything at all", "", &ScoreOptions::default());
        assert!(result.keywords.is_empty());
        assert_eq!(result.score, 0);
        assert_eq!(result.suggestions, GOOD_MATCH_MESSAGE);
    }

    #[test]
    fn test_empty_vocabulary_and_job_text() {
        let result = local("", "", &vocab(&[]));
        assert_eq!(result.score, 0);
        assert!(result.included.is_empty());
        assert!(result.missing.is_empty());
    }

    #[test]
    fn test_empty_resume_misses_everything() {
        let result = local("", "Kubernetes Terraform Docker", &ScoreOptions::default());
        assert!(result.included.is_empty());
        assert_eq!(result.missing, result.keywords);
        assert_eq!(result.missing.len(), 3);
        assert_eq!(result.score, 0);
    }

    #[test]
    fn test_substring_semantics_preserved() {
        let result = local("We need a great starter", "", &vocab(&["art"]));
        assert_eq!(result.included, vec!["art"]);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_full_match_gives_good_match_message() {
        let result = local("docker, aws", "", &vocab(&["Docker", "AWS"]));
        assert_eq!(result.score, 100);
        assert_eq!(result.suggestions, GOOD_MATCH_MESSAGE);
    }

    #[test]
    fn test_suggestions_capped_and_in_discovery_order() {
        let options = ScoreOptions {
            max_suggestions: 2,
            ..ScoreOptions::default()
        };
        let result = local("", "zebra apple mango", &options);
        assert_eq!(
            result.suggestions,
            "Add these keywords to improve match: zebra, apple"
        );
    }

    #[test]
    fn test_zero_max_suggestions_still_reports_gap() {
        let options = ScoreOptions {
            vocabulary: Some(vec!["rust".to_string()]),
            max_suggestions: 0,
            ..ScoreOptions::default()
        };
        let result = local("", "", &options);
        assert_ne!(result.suggestions, GOOD_MATCH_MESSAGE);
    }

    #[test]
    fn test_min_keyword_length_option() {
        let options = ScoreOptions {
            min_keyword_length: 8,
            ..ScoreOptions::default()
        };
        let result = local("", "backend engineering with python", &options);
        // "engineering" passes the length filter, "python" passes as a seed term
        assert_eq!(result.keywords, vec!["engineering", "python"]);
    }

    #[test]
    fn test_idempotent() {
        let options = ScoreOptions::default();
        let job = "Senior Rust engineer: tokio, axum, PostgreSQL, Docker, AWS.";
        let resume = "Built services in Rust with axum and Postgres on AWS.";
        assert_eq!(local(resume, job, &options), local(resume, job, &options));
    }

    #[test]
    fn test_binary_looking_input_is_scored() {
        let junk = "\u{0}\u{1}\u{fffd}\u{7f}ÿþ";
        let result = local(junk, junk, &ScoreOptions::default());
        assert!(result.score <= 100);
        assert_partition(&result);
    }

    #[test]
    fn test_score_bounded_across_inputs() {
        let cases = [
            ("", "", ScoreOptions::default()),
            ("python", "python java", ScoreOptions::default()),
            ("x", "", vocab(&["x", "y", "z", "w", "v", "u", "t"])),
            ("everything kubernetes docker", "kubernetes docker", ScoreOptions::default()),
        ];
        for (resume, job, options) in cases {
            let result = local(resume, job, &options);
            assert!(result.score <= 100);
            assert_partition(&result);
        }
    }

    #[test]
    fn test_method_serializes_lowercase() {
        let result = local("", "", &ScoreOptions::default());
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["method"], "local");
        assert!(json.get("analysis").is_none());
    }

    #[tokio::test]
    async fn test_local_scorer_trait_matches_core() {
        let scorer = LocalScorer::default();
        let options = vocab(&["python", "docker", "aws"]);
        let via_trait = scorer.score("Experienced Python engineer", "", &options).await;
        assert_eq!(via_trait, local("Experienced Python engineer", "", &options));
        assert_eq!(scorer.backend(), ScoringMethod::Local);
    }
}
