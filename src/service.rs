//! The documentation search service: the public face of the crate.
//!
//! One `DocsService` is constructed by the host application and shared by
//! reference. It owns the `(documents, index)` pair as an immutable
//! snapshot behind a read-write lock: searches clone the current snapshot
//! `Arc` and never observe a half-built index; mutations build the
//! replacement snapshot completely and then swap it in.

use std::sync::Arc;

use rand::Rng;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    config::{DEFAULT_CATEGORY_LIMIT, DEFAULT_RELATED_LIMIT, SearchConfig},
    document::{DocumentChunk, IndexStats, NewDocument, SearchResult},
    error::Result,
    index::SearchIndex,
    loader::{CorpusSource, default_sources, load_corpus},
    search::{SearchOptions, execute_search},
};

/// An immutable corpus snapshot: the chunk list and its index.
struct IndexState {
    documents: Vec<DocumentChunk>,
    index: SearchIndex,
}

impl IndexState {
    fn build(
        documents: Vec<DocumentChunk>,
        config: &SearchConfig,
    ) -> Result<Self> {
        let index = SearchIndex::build(&documents, config)?;
        Ok(Self { documents, index })
    }
}

/// Documentation search service. See the module docs for the concurrency
/// model; all methods are safe to call concurrently.
pub struct DocsService {
    config: SearchConfig,
    state: RwLock<Arc<IndexState>>,
}

impl DocsService {
    /// Load the corpus from the default source chain and build the index.
    pub fn load(config: SearchConfig) -> Result<Self> {
        let sources = default_sources(config.chunk_size);
        Self::load_from(&sources, config)
    }

    /// Load the corpus from an explicit source chain.
    pub fn load_from(
        sources: &[Box<dyn CorpusSource>],
        config: SearchConfig,
    ) -> Result<Self> {
        let documents = load_corpus(sources);
        Self::from_documents(documents, config)
    }

    /// Build a service over an already-materialized chunk list. Useful for
    /// callers with their own corpus and for tests with fixture data.
    pub fn from_documents(
        documents: Vec<DocumentChunk>,
        config: SearchConfig,
    ) -> Result<Self> {
        let state = IndexState::build(documents, &config)?;
        info!(
            "search index initialized with {} documents",
            state.documents.len()
        );

        Ok(Self {
            config,
            state: RwLock::new(Arc::new(state)),
        })
    }

    /// Search the corpus. Zero results is a valid, non-error outcome.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>> {
        let snapshot = self.snapshot().await;
        execute_search(&snapshot.index, &self.config, query, options)
    }

    /// Documents in a category, up to `limit` (default 10).
    pub async fn get_documents_by_category(
        &self,
        category: &str,
        limit: Option<usize>,
    ) -> Vec<DocumentChunk> {
        let snapshot = self.snapshot().await;
        snapshot
            .documents
            .iter()
            .filter(|doc| doc.category == category)
            .take(limit.unwrap_or(DEFAULT_CATEGORY_LIMIT))
            .cloned()
            .collect()
    }

    /// Documents sharing at least one tag with the given document,
    /// excluding the document itself, up to `limit` (default 5).
    pub async fn get_related_documents(
        &self,
        document_id: &str,
        limit: Option<usize>,
    ) -> Vec<DocumentChunk> {
        let snapshot = self.snapshot().await;
        let Some(source) =
            snapshot.documents.iter().find(|doc| doc.id == document_id)
        else {
            return Vec::new();
        };

        snapshot
            .documents
            .iter()
            .filter(|doc| {
                doc.id != document_id
                    && doc.tags.iter().any(|tag| source.tags.contains(tag))
            })
            .take(limit.unwrap_or(DEFAULT_RELATED_LIMIT))
            .cloned()
            .collect()
    }

    /// Corpus statistics. Pure read, no mutation.
    pub async fn get_stats(&self) -> IndexStats {
        let snapshot = self.snapshot().await;

        let mut categories = std::collections::BTreeMap::new();
        let mut tags = std::collections::BTreeSet::new();
        for doc in &snapshot.documents {
            *categories.entry(doc.category.clone()).or_insert(0) += 1;
            for tag in &doc.tags {
                tags.insert(tag.clone());
            }
        }

        IndexStats {
            total_documents: snapshot.documents.len(),
            categories,
            total_tags: tags.len(),
        }
    }

    /// Add a document at runtime. Assigns a fresh unique id, rebuilds the
    /// index, and returns the id.
    pub async fn add_document(&self, document: NewDocument) -> Result<String> {
        let id = generate_document_id();

        let mut state = self.state.write().await;
        let mut documents = state.documents.clone();
        documents.push(document.into_chunk(id.clone()));
        *state = Arc::new(IndexState::build(documents, &self.config)?);

        Ok(id)
    }

    /// Remove a document by id, rebuilding the index. Returns whether a
    /// removal occurred; an absent id is not an error.
    pub async fn remove_document(&self, document_id: &str) -> Result<bool> {
        let mut state = self.state.write().await;

        let mut documents = state.documents.clone();
        let before = documents.len();
        documents.retain(|doc| doc.id != document_id);
        if documents.len() == before {
            return Ok(false);
        }

        *state = Arc::new(IndexState::build(documents, &self.config)?);
        Ok(true)
    }

    async fn snapshot(&self) -> Arc<IndexState> {
        self.state.read().await.clone()
    }
}

impl std::fmt::Debug for DocsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsService").finish_non_exhaustive()
    }
}

/// Fresh id for a runtime-added document: millisecond timestamp plus a
/// short random suffix.
fn generate_document_id() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    let suffix: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();

    format!("custom-{millis}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::builtin_docs;

    fn new_doc(title: &str, content: &str, category: &str) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            content: content.to_string(),
            category: category.to_string(),
            tags: vec![category.to_string()],
            url: None,
            last_updated: None,
        }
    }

    fn service() -> DocsService {
        DocsService::from_documents(builtin_docs(), SearchConfig::default())
            .unwrap()
    }

    #[tokio::test]
    async fn search_finds_builtin_docs() {
        let service = service();
        let results = service
            .search("jettons", &SearchOptions::default())
            .await
            .unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].document.id, "ton-docs-jettons");
    }

    #[tokio::test]
    async fn stats_count_documents_categories_and_tags() {
        let service = service();
        let stats = service.get_stats().await;

        assert_eq!(stats.total_documents, builtin_docs().len());
        assert_eq!(stats.categories.get("languages"), Some(&1));
        assert!(stats.total_tags > 0);
    }

    #[tokio::test]
    async fn add_then_remove_restores_stats() {
        let service = service();
        let before = service.get_stats().await;

        let id = service
            .add_document(new_doc(
                "Custom Notes",
                "Notes about multisig wallets on TON.",
                "wallets",
            ))
            .await
            .unwrap();
        assert!(id.starts_with("custom-"));

        let after_add = service.get_stats().await;
        assert_eq!(after_add.total_documents, before.total_documents + 1);

        assert!(service.remove_document(&id).await.unwrap());

        let after_remove = service.get_stats().await;
        assert_eq!(after_remove.total_documents, before.total_documents);

        // The removed document no longer appears in search results.
        let results = service
            .search("multisig", &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.iter().all(|r| r.document.id != id));
    }

    #[tokio::test]
    async fn added_document_is_searchable() {
        let service = service();
        let id = service
            .add_document(new_doc(
                "Sharding Explained",
                "Workchains and shardchains split the load.",
                "infrastructure",
            ))
            .await
            .unwrap();

        let results = service
            .search("shardchains", &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.iter().any(|r| r.document.id == id));
    }

    #[tokio::test]
    async fn remove_missing_id_returns_false() {
        let service = service();
        assert!(!service.remove_document("no-such-id").await.unwrap());
    }

    #[tokio::test]
    async fn documents_by_category_filters_and_limits() {
        let service = service();
        let docs = service.get_documents_by_category("languages", None).await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "ton-docs-tact");

        let none = service.get_documents_by_category("nope", None).await;
        assert!(none.is_empty());

        let limited = service
            .get_documents_by_category("languages", Some(0))
            .await;
        assert!(limited.is_empty());
    }

    #[tokio::test]
    async fn related_documents_share_a_tag() {
        let service = service();
        // "ton-docs-tact" shares "smart contracts" and "development" tags
        // with "ton-docs-smart-contracts".
        let related =
            service.get_related_documents("ton-docs-tact", None).await;
        assert!(!related.is_empty());
        assert!(related.iter().all(|d| d.id != "ton-docs-tact"));
        assert!(related.iter().any(|d| d.id == "ton-docs-smart-contracts"));
    }

    #[tokio::test]
    async fn related_documents_unknown_id_is_empty() {
        let service = service();
        let related = service.get_related_documents("missing", None).await;
        assert!(related.is_empty());
    }

    #[tokio::test]
    async fn generated_ids_are_unique() {
        let a = generate_document_id();
        let b = generate_document_id();
        assert_ne!(a, b);
        assert!(a.starts_with("custom-"));
    }
}
