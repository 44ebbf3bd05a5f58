//! Corpus loading: discover raw documents and turn them into chunks.
//!
//! Sources are tried in priority order until one yields a non-empty
//! corpus: a pre-built JSON index file (searched at several candidate
//! locations), then local markdown trees. A small built-in set of
//! reference documents is always appended so the corpus is never empty.
//! A missing or corrupt source is never fatal; the loader logs and falls
//! through to the next one.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::{
    chunker::{chunk_text, part_title},
    document::DocumentChunk,
};

/// File name of the pre-built JSON index produced by the upstream crawler.
pub const PREBUILT_INDEX_FILE: &str = "docs-index.json";

/// Category subdirectories scanned for markdown documentation.
pub const CATEGORY_DIRS: &[&str] = &[
    "documentation",
    "smart-contracts",
    "languages",
    "tokens",
    "tma",
    "infrastructure",
    "integration",
    "wallets",
];

/// Keywords promoted to tags when they appear in a document.
const TAG_KEYWORDS: &[&str] = &[
    "ton",
    "blockchain",
    "smart contract",
    "wallet",
    "transaction",
    "tact",
    "func",
    "tvm",
    "jetton",
    "nft",
    "telegram",
    "mini app",
    "frontend",
    "react",
    "typescript",
    "deployment",
    "testing",
];

/// A place the loader can try to obtain an initial corpus from.
///
/// Sources are consulted in order; the first one returning a non-empty
/// document list wins.
pub trait CorpusSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attempt to load documents. `None` (or an empty list) means this
    /// source is unavailable and the next one should be tried.
    fn try_load(&self) -> Option<Vec<DocumentChunk>>;
}

/// Pre-built JSON index file, searched at several candidate locations so
/// the crate works both installed and run from a source checkout.
pub struct PrebuiltIndexSource {
    candidates: Vec<PathBuf>,
    chunk_size: usize,
}

impl PrebuiltIndexSource {
    pub fn new(candidates: Vec<PathBuf>, chunk_size: usize) -> Self {
        Self {
            candidates,
            chunk_size,
        }
    }

    /// Candidate locations: the working directory, its `src/` child, and
    /// the executable's directory and parent.
    pub fn default_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(PREBUILT_INDEX_FILE));
            candidates.push(cwd.join("src").join(PREBUILT_INDEX_FILE));
        }

        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                candidates.push(dir.join(PREBUILT_INDEX_FILE));
                if let Some(parent) = dir.parent() {
                    candidates.push(parent.join(PREBUILT_INDEX_FILE));
                }
            }
        }

        candidates
    }

    fn load_file(&self, path: &Path) -> Option<Vec<DocumentChunk>> {
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_json::from_str::<Vec<DocumentChunk>>(&contents) {
            Ok(docs) => Some(docs),
            Err(e) => {
                warn!("ignoring corrupt index file {}: {e}", path.display());
                None
            }
        }
    }
}

impl CorpusSource for PrebuiltIndexSource {
    fn name(&self) -> &'static str {
        "prebuilt-index"
    }

    fn try_load(&self) -> Option<Vec<DocumentChunk>> {
        for candidate in &self.candidates {
            if !candidate.is_file() {
                continue;
            }
            let Some(docs) = self.load_file(candidate) else {
                continue;
            };
            if docs.is_empty() {
                continue;
            }

            debug!(
                "pre-built index found at {} ({} documents)",
                candidate.display(),
                docs.len()
            );

            // Crawled pages can be long; re-chunk anything over budget.
            let chunks: Vec<DocumentChunk> = docs
                .into_par_iter()
                .flat_map(|doc| rechunk_document(doc, self.chunk_size))
                .collect();

            return Some(chunks);
        }

        None
    }
}

/// Split an already-loaded document into bounded chunks, carrying its
/// metadata onto every chunk.
fn rechunk_document(doc: DocumentChunk, chunk_size: usize) -> Vec<DocumentChunk> {
    if doc.content.len() <= chunk_size {
        return vec![doc];
    }

    chunk_text(&doc.content, chunk_size)
        .into_iter()
        .enumerate()
        .map(|(i, content)| DocumentChunk {
            id: format!("{}-chunk-{i}", doc.id),
            title: part_title(&doc.title, i),
            content,
            category: doc.category.clone(),
            tags: doc.tags.clone(),
            url: doc.url.clone(),
            last_updated: doc.last_updated.clone(),
        })
        .collect()
}

/// Markdown files under the fixed category subdirectories of a resources
/// root. The first existing root among the candidates is used.
pub struct MarkdownTreeSource {
    roots: Vec<PathBuf>,
    chunk_size: usize,
}

impl MarkdownTreeSource {
    pub fn new(roots: Vec<PathBuf>, chunk_size: usize) -> Self {
        Self { roots, chunk_size }
    }

    /// Candidate resource roots, mirroring the pre-built index probing.
    pub fn default_roots() -> Vec<PathBuf> {
        let mut roots = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            roots.push(cwd.join("resources"));
            roots.push(cwd.join("src").join("resources"));
        }

        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                roots.push(dir.join("resources"));
            }
        }

        roots
    }

    fn load_root(&self, root: &Path) -> Vec<DocumentChunk> {
        let mut files: Vec<(String, PathBuf)> = Vec::new();

        for category in CATEGORY_DIRS {
            let dir = root.join(category);
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let is_md = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext == "md");
                if path.is_file() && is_md {
                    files.push((category.to_string(), path));
                }
            }
        }

        files.sort_by(|a, b| a.1.cmp(&b.1));

        // Read and chunk in parallel; file order is preserved.
        files
            .par_iter()
            .filter_map(|(category, path)| {
                let content = std::fs::read_to_string(path).ok()?;
                Some(chunk_markdown_file(
                    category,
                    path,
                    &content,
                    self.chunk_size,
                ))
            })
            .flatten()
            .collect()
    }
}

impl CorpusSource for MarkdownTreeSource {
    fn name(&self) -> &'static str {
        "markdown-tree"
    }

    fn try_load(&self) -> Option<Vec<DocumentChunk>> {
        for root in &self.roots {
            if !root.is_dir() {
                continue;
            }
            let docs = self.load_root(root);
            if !docs.is_empty() {
                debug!(
                    "markdown tree at {} yielded {} chunks",
                    root.display(),
                    docs.len()
                );
                return Some(docs);
            }
        }

        None
    }
}

fn chunk_markdown_file(
    category: &str,
    path: &Path,
    content: &str,
    chunk_size: usize,
) -> Vec<DocumentChunk> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    let title = extract_title(content, stem);
    let tags = extract_tags(content, category);
    let url = format!("https://docs.ton.org/{category}/{stem}");

    chunk_text(content, chunk_size)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| DocumentChunk {
            id: format!("{category}-{stem}-chunk-{i}"),
            title: part_title(&title, i),
            content: chunk,
            category: category.to_string(),
            tags: tags.clone(),
            url: Some(url.clone()),
            last_updated: None,
        })
        .collect()
}

/// Extract a title from markdown content.
///
/// Looks for the first `# ` heading; falls back to the filename stem with
/// dashes expanded and words capitalized.
fn extract_title(content: &str, stem: &str) -> String {
    for line in content.lines() {
        if let Some(heading) = line.trim().strip_prefix("# ") {
            let heading = heading.trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }

    stem.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + chars.as_str()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build the tag list for a document: the category first, then every
/// keyword found in the content. Duplicates are collapsed.
fn extract_tags(content: &str, category: &str) -> Vec<String> {
    let lower = content.to_lowercase();
    let mut tags = vec![category.to_string()];

    for keyword in TAG_KEYWORDS {
        if lower.contains(keyword) && !tags.iter().any(|t| t == keyword) {
            tags.push((*keyword).to_string());
        }
    }

    tags
}

/// Built-in reference documents covering core TON concepts.
///
/// Appended unconditionally as a durable baseline, so a fresh install with
/// no index file and no local resources still answers basic queries.
pub fn builtin_docs() -> Vec<DocumentChunk> {
    let entries: &[(&str, &str, &str, &str, &[&str], &str)] = &[
        (
            "ton-docs-overview",
            "TON Blockchain Overview",
            "Official TON blockchain documentation covering architecture, \
             consensus, and core concepts.",
            "documentation",
            &["ton", "blockchain", "overview", "documentation"],
            "https://docs.ton.org/",
        ),
        (
            "ton-docs-smart-contracts",
            "Smart Contract Development",
            "Complete guide to developing smart contracts on TON using Tact \
             and FunC languages.",
            "smart-contracts",
            &["smart contracts", "tact", "func", "development"],
            "https://docs.ton.org/develop/smart-contracts/",
        ),
        (
            "ton-docs-tact",
            "Tact Programming Language",
            "Official documentation for the Tact programming language - the \
             recommended way to write TON smart contracts.",
            "languages",
            &["tact", "language", "smart contracts", "development"],
            "https://docs.ton.org/develop/smart-contracts/tact/",
        ),
        (
            "ton-docs-tvm",
            "TON Virtual Machine (TVM)",
            "Technical documentation for TVM - TON's custom virtual machine \
             for executing smart contracts.",
            "infrastructure",
            &["tvm", "virtual machine", "execution", "technical"],
            "https://docs.ton.org/learn/tvm-instructions/tvm-overview",
        ),
        (
            "ton-docs-jettons",
            "Jettons (TON Tokens)",
            "Official standard and implementation guide for fungible tokens \
             on TON blockchain.",
            "tokens",
            &["jettons", "tokens", "standards", "fungible"],
            "https://docs.ton.org/develop/dapps/asset-processing/jettons",
        ),
        (
            "ton-connect-docs",
            "TON Connect Protocol",
            "Official documentation for TON Connect - the standard protocol \
             for TON wallet connections.",
            "integration",
            &["ton connect", "wallets", "integration", "protocol"],
            "https://docs.ton.org/develop/dapps/ton-connect",
        ),
        (
            "telegram-mini-apps",
            "Telegram Mini Apps",
            "Official guide for developing Telegram Mini Apps that integrate \
             with TON blockchain.",
            "tma",
            &["telegram", "mini apps", "tma", "web apps"],
            "https://docs.ton.org/develop/dapps/telegram-apps/",
        ),
    ];

    entries
        .iter()
        .map(|(id, title, content, category, tags, url)| DocumentChunk {
            id: (*id).to_string(),
            title: (*title).to_string(),
            content: (*content).to_string(),
            category: (*category).to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            url: Some((*url).to_string()),
            last_updated: None,
        })
        .collect()
}

/// Run the source chain and return the initial corpus.
///
/// The first source producing documents wins; the built-in reference set
/// is appended regardless, so the result is never empty.
pub fn load_corpus(sources: &[Box<dyn CorpusSource>]) -> Vec<DocumentChunk> {
    let mut corpus = Vec::new();

    for source in sources {
        match source.try_load() {
            Some(docs) if !docs.is_empty() => {
                info!("loaded {} chunks from {}", docs.len(), source.name());
                corpus = docs;
                break;
            }
            _ => {
                debug!("corpus source {} unavailable", source.name());
            }
        }
    }

    corpus.extend(builtin_docs());
    corpus
}

/// The default source chain for the given chunk budget.
pub fn default_sources(chunk_size: usize) -> Vec<Box<dyn CorpusSource>> {
    vec![
        Box::new(PrebuiltIndexSource::new(
            PrebuiltIndexSource::default_candidates(),
            chunk_size,
        )),
        Box::new(MarkdownTreeSource::new(
            MarkdownTreeSource::default_roots(),
            chunk_size,
        )),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_docs_have_unique_ids() {
        let docs = builtin_docs();
        let ids: std::collections::HashSet<_> =
            docs.iter().map(|d| &d.id).collect();
        assert_eq!(ids.len(), docs.len());
        assert!(!docs.is_empty());
    }

    #[test]
    fn load_corpus_never_empty_without_sources() {
        let corpus = load_corpus(&[]);
        assert_eq!(corpus.len(), builtin_docs().len());
    }

    #[test]
    fn prebuilt_index_wins_over_markdown() {
        let tmp = tempfile::tempdir().unwrap();
        let index_path = tmp.path().join(PREBUILT_INDEX_FILE);
        std::fs::write(
            &index_path,
            r#"[{
                "id": "crawled-1",
                "title": "Crawled Page",
                "content": "Some crawled content about validators.",
                "category": "documentation",
                "tags": ["ton"],
                "url": "https://docs.ton.org/validators",
                "lastUpdated": "2024-01-01T00:00:00.000Z"
            }]"#,
        )
        .unwrap();

        let sources: Vec<Box<dyn CorpusSource>> = vec![Box::new(
            PrebuiltIndexSource::new(vec![index_path], 1000),
        )];

        let corpus = load_corpus(&sources);
        assert!(corpus.iter().any(|d| d.id == "crawled-1"));
        // Built-ins are still appended.
        assert!(corpus.iter().any(|d| d.id == "ton-docs-tact"));
    }

    #[test]
    fn corrupt_prebuilt_index_falls_through() {
        let tmp = tempfile::tempdir().unwrap();
        let index_path = tmp.path().join(PREBUILT_INDEX_FILE);
        std::fs::write(&index_path, "{ not json ]").unwrap();

        let source = PrebuiltIndexSource::new(vec![index_path], 1000);
        assert!(source.try_load().is_none());
    }

    #[test]
    fn long_prebuilt_documents_are_rechunked() {
        let sentences = "validators secure the network. ".repeat(100);
        let doc = DocumentChunk {
            id: "big".to_string(),
            title: "Big Page".to_string(),
            content: sentences,
            category: "documentation".to_string(),
            tags: vec!["ton".to_string()],
            url: None,
            last_updated: None,
        };

        let chunks = rechunk_document(doc, 200);
        assert!(chunks.len() > 1);
        assert_eq!(chunks[0].id, "big-chunk-0");
        assert_eq!(chunks[0].title, "Big Page");
        assert_eq!(chunks[1].title, "Big Page (part 2)");
        let ids: std::collections::HashSet<_> =
            chunks.iter().map(|c| &c.id).collect();
        assert_eq!(ids.len(), chunks.len());
    }

    #[test]
    fn markdown_tree_loads_category_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("languages");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("tact-guide.md"),
            "# Tact Guide\n\nTact is a language for TON smart contracts.",
        )
        .unwrap();
        // Files outside the category list are ignored.
        let stray = tmp.path().join("misc");
        std::fs::create_dir_all(&stray).unwrap();
        std::fs::write(stray.join("note.md"), "# Stray").unwrap();

        let source =
            MarkdownTreeSource::new(vec![tmp.path().to_path_buf()], 1000);
        let docs = source.try_load().unwrap();

        assert_eq!(docs.len(), 1);
        let doc = &docs[0];
        assert_eq!(doc.title, "Tact Guide");
        assert_eq!(doc.category, "languages");
        assert_eq!(doc.id, "languages-tact-guide-chunk-0");
        assert!(doc.tags.contains(&"languages".to_string()));
        assert!(doc.tags.contains(&"tact".to_string()));
        assert!(doc.tags.contains(&"smart contract".to_string()));
        assert_eq!(
            doc.url.as_deref(),
            Some("https://docs.ton.org/languages/tact-guide")
        );
    }

    #[test]
    fn missing_category_dirs_are_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let source =
            MarkdownTreeSource::new(vec![tmp.path().to_path_buf()], 1000);
        assert!(source.try_load().is_none());
    }

    #[test]
    fn extract_title_prefers_heading() {
        assert_eq!(extract_title("# My Title\n\nbody", "file"), "My Title");
        assert_eq!(extract_title("no heading", "tact-by-example"), "Tact By Example");
        assert_eq!(extract_title("# \nempty heading", "x"), "X");
    }

    #[test]
    fn extract_tags_dedupes_and_keeps_category_first() {
        let tags = extract_tags(
            "Deploy your jetton wallet. Jetton transfers cost gas.",
            "tokens",
        );
        assert_eq!(tags[0], "tokens");
        assert_eq!(
            tags.iter().filter(|t| t.as_str() == "jetton").count(),
            1
        );
        assert!(tags.contains(&"wallet".to_string()));
    }
}
