//! tondocs - a fuzzy search engine over TON documentation corpora.
//!
//! tondocs turns a heterogeneous set of source documents (a pre-crawled
//! JSON index, local markdown trees, and built-in reference entries) into
//! sentence-aligned chunks, builds a weighted fuzzy index over them with
//! [Tantivy](https://github.com/quickwit-oss/tantivy), and serves ranked
//! queries with typo tolerance, category filters and relevance boosting.
//!
//! # Quick start
//!
//! ```no_run
//! use tondocs::{DocsService, SearchConfig, SearchOptions};
//!
//! # async fn run() -> tondocs::Result<()> {
//! let service = DocsService::load(SearchConfig::default())?;
//!
//! let options = SearchOptions {
//!     category: Some("smart-contracts".to_string()),
//!     limit: Some(5),
//!     ..Default::default()
//! };
//!
//! let results = service.search("deploy a jetton", &options).await?;
//! for r in &results {
//!     println!("{} (score: {:.3})", r.document.title, r.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod config;
pub mod document;
pub mod error;
pub mod index;
pub mod loader;
pub mod normalize;
pub mod search;
pub mod service;

pub use config::SearchConfig;
pub use document::{
    DocumentChunk,
    FieldMatch,
    IndexStats,
    NewDocument,
    SearchResult,
};
pub use error::{Error, Result};
pub use search::SearchOptions;
pub use service::DocsService;
