//! Weighted fuzzy-search index over the chunk set.
//!
//! The index lives entirely in RAM and is rebuilt from scratch whenever
//! the chunk set changes; at corpus scale (hundreds to low thousands of
//! chunks) a full rebuild is cheap and keeps the update contract simple.
//! Each chunk is stored as a single JSON payload so results can be
//! reconstructed without a separate lookup table.

use tantivy::{
    Index,
    IndexReader,
    TantivyDocument,
    collector::TopDocs,
    query::{
        BooleanQuery,
        BoostQuery,
        FuzzyTermQuery,
        Occur,
        PhraseQuery,
        Query,
        QueryParser,
        TermQuery,
    },
    schema::{
        FAST,
        Field,
        IndexRecordOption,
        STORED,
        STRING,
        Schema,
        TEXT,
        Value,
    },
};

use crate::{config::SearchConfig, document::DocumentChunk, error::Result};

/// Field names used in the schema.
mod fields {
    pub const TITLE: &str = "title";
    pub const CONTENT: &str = "content";
    pub const TAGS: &str = "tags";
    pub const CATEGORY_TEXT: &str = "category_text";
    pub const CATEGORY: &str = "category";
    pub const PAYLOAD: &str = "payload";
}

/// Relative field weights. Only the ordering is an invariant:
/// title > tags > content > category.
const TITLE_WEIGHT: f32 = 3.0;
const TAGS_WEIGHT: f32 = 2.0;
const CONTENT_WEIGHT: f32 = 1.0;
const CATEGORY_WEIGHT: f32 = 0.5;

/// Resolved field handles for the schema.
#[derive(Clone, Copy)]
struct SchemaFields {
    title: Field,
    content: Field,
    tags: Field,
    category_text: Field,
    category: Field,
    payload: Field,
}

/// Strict filters applied as `Must` clauses alongside the scored query.
#[derive(Debug, Default, Clone)]
pub struct Filter<'a> {
    pub category: Option<&'a str>,
    pub tags: &'a [String],
}

/// A raw index hit: the BM25 score and the reconstructed chunk.
#[derive(Debug, Clone)]
pub struct RawHit {
    pub bm25: f32,
    pub document: DocumentChunk,
}

/// An in-RAM tantivy index over a fixed chunk set.
pub struct SearchIndex {
    index: Index,
    reader: IndexReader,
    schema_fields: SchemaFields,
    fuzzy_distance: u8,
    min_fuzzy_term_len: usize,
}

fn build_schema() -> (Schema, SchemaFields) {
    let mut builder = Schema::builder();

    let title = builder.add_text_field(fields::TITLE, TEXT);
    let content = builder.add_text_field(fields::CONTENT, TEXT);
    let tags = builder.add_text_field(fields::TAGS, TEXT);
    let category_text = builder.add_text_field(fields::CATEGORY_TEXT, TEXT);
    // Raw single-token field for exact category filtering.
    let category = builder.add_text_field(fields::CATEGORY, STRING | FAST);
    let payload = builder.add_text_field(fields::PAYLOAD, STORED);

    let schema = builder.build();
    let schema_fields = SchemaFields {
        title,
        content,
        tags,
        category_text,
        category,
        payload,
    };

    (schema, schema_fields)
}

impl SearchIndex {
    /// Build a fresh index over the given chunks.
    pub fn build(
        documents: &[DocumentChunk],
        config: &SearchConfig,
    ) -> Result<Self> {
        let (schema, schema_fields) = build_schema();
        let index = Index::create_in_ram(schema);

        let mut writer = index.writer(15_000_000)?;
        for chunk in documents {
            let mut doc = TantivyDocument::default();
            doc.add_text(schema_fields.title, &chunk.title);
            doc.add_text(schema_fields.content, &chunk.content);
            for tag in &chunk.tags {
                doc.add_text(schema_fields.tags, tag);
            }
            doc.add_text(schema_fields.category_text, &chunk.category);
            doc.add_text(
                schema_fields.category,
                chunk.category.to_lowercase(),
            );
            doc.add_text(schema_fields.payload, serde_json::to_string(chunk)?);
            writer.add_document(doc)?;
        }
        writer.commit()?;

        let reader = index.reader()?;

        Ok(Self {
            index,
            reader,
            schema_fields,
            fuzzy_distance: config.fuzzy_distance,
            min_fuzzy_term_len: config.min_fuzzy_term_len,
        })
    }

    fn weighted_parser(&self) -> QueryParser {
        let f = self.schema_fields;
        let mut parser = QueryParser::for_index(
            &self.index,
            vec![f.title, f.tags, f.content, f.category_text],
        );
        parser.set_field_boost(f.title, TITLE_WEIGHT);
        parser.set_field_boost(f.tags, TAGS_WEIGHT);
        parser.set_field_boost(f.content, CONTENT_WEIGHT);
        parser.set_field_boost(f.category_text, CATEGORY_WEIGHT);
        parser
    }

    /// Fuzzy clauses for each query term long enough to tolerate a typo.
    /// Shorter terms (2-char acronyms) still match exactly through the
    /// parsed query. Each clause carries its field's weight so fuzzy hits
    /// keep the title > tags > content ordering.
    fn fuzzy_clauses(&self, query_str: &str) -> Vec<(Occur, Box<dyn Query>)> {
        let f = self.schema_fields;
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for raw_term in query_str.split_whitespace() {
            let term: String = raw_term
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if term.len() < self.min_fuzzy_term_len {
                continue;
            }

            for (field, weight) in [
                (f.title, TITLE_WEIGHT),
                (f.tags, TAGS_WEIGHT),
                (f.content, CONTENT_WEIGHT),
            ] {
                let term = tantivy::Term::from_field_text(field, &term);
                let fuzzy =
                    FuzzyTermQuery::new(term, self.fuzzy_distance, true);
                let boosted = BoostQuery::new(Box::new(fuzzy), weight);
                clauses.push((Occur::Should, Box::new(boosted)));
            }
        }

        clauses
    }

    /// Execute a query with optional strict filters, returning up to
    /// `limit` hits ordered by descending BM25 score.
    pub fn query(
        &self,
        query_str: &str,
        filter: &Filter<'_>,
        limit: usize,
    ) -> Result<Vec<RawHit>> {
        if query_str.trim().is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let f = self.schema_fields;
        let searcher = self.reader.searcher();

        let parser = self.weighted_parser();
        let (parsed, _errors) = parser.parse_query_lenient(query_str);

        let mut scored: Vec<(Occur, Box<dyn Query>)> =
            vec![(Occur::Should, parsed)];
        scored.extend(self.fuzzy_clauses(query_str));
        let scored: Box<dyn Query> = Box::new(BooleanQuery::new(scored));

        let mut clauses: Vec<(Occur, Box<dyn Query>)> =
            vec![(Occur::Must, scored)];

        if let Some(category) = filter.category {
            let term = tantivy::Term::from_field_text(
                f.category,
                &category.to_lowercase(),
            );
            let query = TermQuery::new(term, IndexRecordOption::Basic);
            clauses.push((Occur::Must, Box::new(query)));
        }

        // Each tag filter must match a whole tag: multi-word tags become
        // phrase queries so "smart contracts" does not pass on "smart".
        for tag in filter.tags {
            let mut terms: Vec<tantivy::Term> = tag
                .split_whitespace()
                .map(|t| {
                    t.chars()
                        .filter(|c| c.is_alphanumeric())
                        .collect::<String>()
                        .to_lowercase()
                })
                .filter(|t| !t.is_empty())
                .map(|t| tantivy::Term::from_field_text(f.tags, &t))
                .collect();

            if terms.len() == 1 {
                let term = terms.remove(0);
                let query = TermQuery::new(term, IndexRecordOption::Basic);
                clauses.push((Occur::Must, Box::new(query)));
            } else if !terms.is_empty() {
                clauses.push((Occur::Must, Box::new(PhraseQuery::new(terms))));
            }
        }

        let query = BooleanQuery::new(clauses);
        let top_docs = searcher.search(&query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (bm25, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let payload = doc
                .get_first(f.payload)
                .and_then(|v| v.as_str())
                .unwrap_or("{}");
            let document: DocumentChunk = serde_json::from_str(payload)?;
            hits.push(RawHit { bm25, document });
        }

        Ok(hits)
    }
}

impl std::fmt::Debug for SearchIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchIndex").finish_non_exhaustive()
    }
}
