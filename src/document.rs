//! Core data types: document chunks, search results and corpus statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The unit of indexing and the unit returned to callers.
///
/// Serializes with camelCase field names; a pre-built index file is a flat
/// JSON array of these objects (`id, title, url, content, category, tags,
/// lastUpdated`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunk {
    /// Unique, deterministic id (source document id + chunk offset, or a
    /// generated id for runtime-added documents).
    pub id: String,
    /// Human-readable title. Chunks after the first from the same source
    /// document carry a `" (part N)"` suffix.
    pub title: String,
    /// Chunk text, bounded by the configured chunk size. Never empty.
    pub content: String,
    /// One of a small fixed vocabulary (smart-contracts, languages,
    /// tokens, tma, ...), used for filtering and as a minor ranking signal.
    pub category: String,
    /// Deduplicated tag list, used for filtering and boosting.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Source URL, if any. URLs on the official documentation host earn a
    /// trust boost at ranking time.
    pub url: Option<String>,
    /// Informational timestamp string.
    pub last_updated: Option<String>,
}

/// A document supplied by a caller at runtime, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub url: Option<String>,
    pub last_updated: Option<String>,
}

impl NewDocument {
    pub(crate) fn into_chunk(self, id: String) -> DocumentChunk {
        DocumentChunk {
            id,
            title: self.title,
            content: self.content,
            category: self.category,
            tags: self.tags,
            url: self.url,
            last_updated: self.last_updated,
        }
    }
}

/// Which field a query term was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    /// Field name: `title`, `content`, `tags` or `category`.
    pub field: &'static str,
    /// The query term found in that field.
    pub term: String,
}

/// A ranked search hit.
///
/// `score` is a distance: `0.0` is a perfect match, larger is worse.
/// Result lists handed to callers are sorted ascending by the boosted
/// score, not the raw index score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub document: DocumentChunk,
    pub score: f32,
    pub matches: Vec<FieldMatch>,
}

/// Corpus statistics, a pure read over the current snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_documents: usize,
    /// Document count per category.
    pub categories: BTreeMap<String, usize>,
    /// Number of distinct tags across the corpus.
    pub total_tags: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_round_trips_through_json_contract() {
        let json = r#"{
            "id": "docs-ton-org--develop-",
            "title": "Smart Contract Development",
            "url": "https://docs.ton.org/develop/smart-contracts/",
            "content": "Complete guide to developing smart contracts on TON.",
            "category": "smart-contracts",
            "tags": ["smart contracts", "tact"],
            "lastUpdated": "2024-01-15T00:00:00.000Z"
        }"#;

        let chunk: DocumentChunk = serde_json::from_str(json).unwrap();
        assert_eq!(chunk.category, "smart-contracts");
        assert_eq!(chunk.last_updated.as_deref(), Some("2024-01-15T00:00:00.000Z"));

        let value = serde_json::to_value(&chunk).unwrap();
        assert!(value.get("lastUpdated").is_some(), "must stay camelCase");
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let json = r#"{
            "id": "x",
            "title": "T",
            "content": "c",
            "category": "general"
        }"#;

        let chunk: DocumentChunk = serde_json::from_str(json).unwrap();
        assert!(chunk.url.is_none());
        assert!(chunk.last_updated.is_none());
        assert!(chunk.tags.is_empty());
    }
}
