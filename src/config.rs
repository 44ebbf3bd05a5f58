//! Tuning knobs for chunking, matching and ranking.
//!
//! The fuzzy threshold and boost values were tuned empirically; none of
//! them is load-bearing for correctness. Tests assert ordering properties,
//! not the exact numbers.

/// Default maximum chunk size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

/// Default number of results returned by a search.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Default number of results per category listing.
pub const DEFAULT_CATEGORY_LIMIT: usize = 10;

/// Default number of related documents returned.
pub const DEFAULT_RELATED_LIMIT: usize = 5;

/// Search and ranking configuration.
///
/// Scores are distances: `0.0` is a perfect match, larger is worse.
/// Boosts are subtracted from a result's raw score before the final sort.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Levenshtein distance for fuzzy term matching.
    pub fuzzy_distance: u8,
    /// Minimum term length (in bytes) eligible for fuzzy matching.
    /// Shorter terms (domain acronyms like "tvm") still match exactly.
    pub min_fuzzy_term_len: usize,
    /// Results with a raw score above this ceiling are dropped as
    /// coincidental matches.
    pub max_score: f32,
    /// Boost for documents hosted on the official documentation site.
    pub official_boost: f32,
    /// Boost for documents with a tag appearing verbatim in the query.
    pub tag_boost: f32,
    /// Host substring identifying the official documentation site.
    pub official_host: String,
    /// Per-term result cap during the fallback term-by-term search.
    pub per_term_limit: usize,
    /// Minimum term length considered in the fallback term-by-term search.
    pub min_fallback_term_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            fuzzy_distance: 1,
            min_fuzzy_term_len: 3,
            max_score: 0.98,
            official_boost: 0.10,
            tag_boost: 0.05,
            official_host: "docs.ton.org".to_string(),
            per_term_limit: 5,
            min_fallback_term_len: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SearchConfig::default();
        assert!(config.chunk_size > 0);
        assert!(config.max_score > 0.0 && config.max_score <= 1.0);
        assert!(config.official_boost > 0.0);
        assert!(config.tag_boost > 0.0);
        assert_eq!(config.official_host, "docs.ton.org");
    }
}
