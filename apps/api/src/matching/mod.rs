// Resume ↔ job description keyword matching.
// Implements: keyword extraction, local substring scoring, optional LLM-enriched scoring.

pub mod enriched;
pub mod keywords;
pub mod prompts;
pub mod scorer;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::matching::enriched::EnrichedScorer;
use crate::matching::keywords::SeedTerms;
use crate::matching::scorer::{LocalScorer, MatchScorer, ScoreOptions};

/// Selects the scorer backend once at startup.
/// Enriched scoring requires both `ENABLE_LLM_MATCH_SCORING` and an LLM client.
pub fn build_match_scorer(config: &Config, llm: Option<&LlmClient>) -> Arc<dyn MatchScorer> {
    let seeds = SeedTerms::with_extra(&config.match_extra_seed_terms);
    info!("Keyword seed terms: {}", seeds.len());
    let local = LocalScorer::new(seeds);

    match (config.enable_llm_match_scoring, llm) {
        (true, Some(llm)) => {
            info!("Match scorer: enriched (LLM) with local fallback");
            Arc::new(EnrichedScorer::new(
                llm.clone(),
                local,
                Duration::from_secs(config.enrichment_timeout_secs),
            ))
        }
        (true, None) => {
            warn!("ENABLE_LLM_MATCH_SCORING is set but ANTHROPIC_API_KEY is missing; using local scorer");
            Arc::new(local)
        }
        (false, _) => {
            info!("Match scorer: local");
            Arc::new(local)
        }
    }
}

/// Default per-call options derived from configuration.
pub fn default_score_options(config: &Config) -> ScoreOptions {
    ScoreOptions {
        vocabulary: None,
        min_keyword_length: config.match_min_keyword_length,
        max_suggestions: config.match_max_suggestions,
    }
}
