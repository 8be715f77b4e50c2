//! Keyword extraction: tokenizes job text and normalizes vocabularies into an ordered keyword set.

use std::collections::HashSet;

/// Common technical terms that qualify as keywords regardless of length.
/// Extend at deploy time via `MATCH_EXTRA_SEED_TERMS` rather than editing this list.
pub const TECH_SEED_TERMS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "sql",
    "html",
    "css",
    "react",
    "node",
    "aws",
    "docker",
    "kubernetes",
    "fastapi",
    "django",
    "flask",
    "git",
    "linux",
    "windows",
    "mongodb",
    "postgresql",
    "mysql",
    "nosql",
    "api",
    "rest",
    "graphql",
];

/// Seed terms used during extraction. Always case-folded.
#[derive(Debug, Clone)]
pub struct SeedTerms(HashSet<String>);

impl Default for SeedTerms {
    fn default() -> Self {
        Self(TECH_SEED_TERMS.iter().map(|t| t.to_string()).collect())
    }
}

impl SeedTerms {
    /// Built-in seeds plus `extra`, normalized the same way as vocabulary entries.
    pub fn with_extra<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seeds = Self::default();
        for term in extra {
            let term = term.as_ref().trim().to_lowercase();
            if !term.is_empty() {
                seeds.0.insert(term);
            }
        }
        seeds
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Insertion-ordered, deduplicated keyword set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl KeywordSet {
    /// Inserts `keyword` if absent. Returns whether it was new.
    pub fn insert(&mut self, keyword: String) -> bool {
        if self.seen.contains(&keyword) {
            return false;
        }
        self.seen.insert(keyword.clone());
        self.ordered.push(keyword);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

/// Splits on every non-alphabetic character and case-folds. Empty fragments are dropped.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Extracts keywords from job text: tokens at least `min_len` characters long, or seed terms.
pub fn extract_keywords(job_text: &str, min_len: usize, seeds: &SeedTerms) -> KeywordSet {
    let mut keywords = KeywordSet::default();
    for token in tokenize(job_text) {
        if token.chars().count() >= min_len || seeds.contains(&token) {
            keywords.insert(token);
        }
    }
    keywords
}

/// Normalizes a caller-supplied vocabulary. No length filter: the vocabulary is authoritative.
pub fn normalize_vocabulary<I, S>(vocabulary: I) -> KeywordSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut keywords = KeywordSet::default();
    for term in vocabulary {
        let term = term.as_ref().trim().to_lowercase();
        if !term.is_empty() {
            keywords.insert(term);
        }
    }
    keywords
}
