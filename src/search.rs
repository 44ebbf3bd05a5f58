//! The ranking pipeline behind `DocsService::search`.
//!
//! 1. Build the effective query from the normalized query text.
//! 2. Primary search against the index, capped at `limit`.
//! 3. Fallback cascade on zero results: retry with the raw query, then
//!    search whitespace terms independently and union the hits.
//! 4. Drop low-relevance hits (score ceiling, caller's `min_score`).
//! 5. Re-rank by boosted score (official source, exact tag match) and
//!    truncate to `limit`.
//!
//! Nothing here errors for malformed or unmatched queries; the empty list
//! is the correct representation of "no results".

use std::collections::HashMap;

use crate::{
    config::{DEFAULT_SEARCH_LIMIT, SearchConfig},
    document::{DocumentChunk, FieldMatch, SearchResult},
    error::Result,
    index::{Filter, RawHit, SearchIndex},
    normalize::normalize_query,
};

/// Caller-supplied search options.
#[derive(Debug, Default, Clone)]
pub struct SearchOptions {
    /// Restrict results to a single category.
    pub category: Option<String>,
    /// Restrict results to documents matching these tags.
    pub tags: Vec<String>,
    /// Maximum number of results (default 20).
    pub limit: Option<usize>,
    /// Upper bound on the (raw) score: results scoring worse are dropped.
    pub min_score: Option<f32>,
}

/// Convert a BM25 score to the caller-facing distance scale, where `0.0`
/// is a perfect match. Strictly decreasing, so BM25 ordering is preserved.
fn to_distance(bm25: f32) -> f32 {
    1.0 / (1.0 + bm25.max(0.0))
}

/// Boosted score used for the final sort: the raw distance minus the
/// official-source and exact-tag boosts. Lower is better.
pub(crate) fn boosted_score(
    document: &DocumentChunk,
    raw_score: f32,
    query_lower: &str,
    config: &SearchConfig,
) -> f32 {
    let mut score = raw_score;

    if document
        .url
        .as_deref()
        .is_some_and(|url| url.contains(&config.official_host))
    {
        score -= config.official_boost;
    }

    if document
        .tags
        .iter()
        .any(|tag| query_lower.contains(&tag.to_lowercase()))
    {
        score -= config.tag_boost;
    }

    score
}

/// Which fields contain which query terms, for result labeling.
fn compute_matches(document: &DocumentChunk, query: &str) -> Vec<FieldMatch> {
    let mut matches = Vec::new();
    let title = document.title.to_lowercase();
    let content = document.content.to_lowercase();
    let category = document.category.to_lowercase();
    let tags: Vec<String> =
        document.tags.iter().map(|t| t.to_lowercase()).collect();

    for term in query.split_whitespace() {
        let term = term.to_lowercase();
        if term.is_empty() {
            continue;
        }
        if title.contains(&term) {
            matches.push(FieldMatch {
                field: "title",
                term: term.clone(),
            });
        }
        if content.contains(&term) {
            matches.push(FieldMatch {
                field: "content",
                term: term.clone(),
            });
        }
        if tags.iter().any(|t| t.contains(&term)) {
            matches.push(FieldMatch {
                field: "tags",
                term: term.clone(),
            });
        }
        if category.contains(&term) {
            matches.push(FieldMatch {
                field: "category",
                term,
            });
        }
    }

    matches
}

/// Terms eligible for the per-term fallback search: whitespace-delimited,
/// stripped of punctuation, longer than the configured minimum.
fn fallback_terms(query: &str, config: &SearchConfig) -> Vec<String> {
    query
        .split_whitespace()
        .map(|t| {
            t.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|t| t.len() >= config.min_fallback_term_len)
        .collect::<Vec<_>>()
}

/// Union per-term hits, keeping the best (highest BM25) hit per document.
fn union_hits(per_term: Vec<Vec<RawHit>>) -> Vec<RawHit> {
    let mut best: HashMap<String, RawHit> = HashMap::new();

    for hit in per_term.into_iter().flatten() {
        match best.get(&hit.document.id) {
            Some(existing) if existing.bm25 >= hit.bm25 => {}
            _ => {
                best.insert(hit.document.id.clone(), hit);
            }
        }
    }

    let mut hits: Vec<RawHit> = best.into_values().collect();
    hits.sort_by(|a, b| b.bm25.total_cmp(&a.bm25));
    hits
}

/// Run the full search pipeline. See the module docs for the stages.
pub(crate) fn execute_search(
    index: &SearchIndex,
    config: &SearchConfig,
    query: &str,
    options: &SearchOptions,
) -> Result<Vec<SearchResult>> {
    let limit = options.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    let filter = Filter {
        category: options.category.as_deref(),
        tags: &options.tags,
    };

    let normalized = normalize_query(query);

    // Primary search with the normalized query.
    let mut hits = index.query(&normalized, &filter, limit)?;

    // Fallback: the raw query, if normalization changed it.
    if hits.is_empty() && normalized != query.trim().to_lowercase() {
        hits = index.query(query, &filter, limit)?;
    }

    // Fallback: individual terms, unioned. A fuzzy match against a long
    // multi-word query can fail even when every term is well represented.
    if hits.is_empty() {
        let per_term: Vec<Vec<RawHit>> = fallback_terms(query, config)
            .iter()
            .map(|term| index.query(term, &filter, config.per_term_limit))
            .collect::<Result<_>>()?;
        hits = union_hits(per_term);
        hits.truncate(limit);
    }

    let query_lower = query.trim().to_lowercase();

    let mut results: Vec<(f32, SearchResult)> = hits
        .into_iter()
        .filter_map(|hit| {
            let raw_score = to_distance(hit.bm25);
            if raw_score > config.max_score {
                return None;
            }
            if let Some(min_score) = options.min_score {
                if raw_score > min_score {
                    return None;
                }
            }

            let boosted =
                boosted_score(&hit.document, raw_score, &query_lower, config);
            let matches = compute_matches(&hit.document, &normalized);
            Some((
                boosted,
                SearchResult {
                    document: hit.document,
                    score: raw_score,
                    matches,
                },
            ))
        })
        .collect();

    results.sort_by(|a, b| a.0.total_cmp(&b.0));
    results.truncate(limit);

    Ok(results.into_iter().map(|(_, r)| r).collect())
}
