//! Sentence-aligned document chunking.
//!
//! Long documents are split into bounded-size chunks that prefer to break
//! on sentence boundaries, so each chunk is independently indexable and
//! result snippets stay concise. Chunking is a pure function: the same
//! `(text, chunk_size)` pair always yields the same chunk list.

/// Split text into sentence-like units on terminal punctuation.
///
/// Empty fragments (e.g. from `"..."`) are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split `text` into chunks of at most `chunk_size` bytes, breaking on
/// sentence boundaries.
///
/// Sentences are accumulated into a buffer; when appending the next
/// sentence would exceed `chunk_size` and the buffer is non-empty, the
/// buffer is flushed and the sentence starts a new chunk. A single
/// sentence longer than `chunk_size` becomes a chunk on its own.
///
/// Never returns an empty list for non-empty input: if sentence splitting
/// yields nothing, the whole text is returned as one chunk.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(text) {
        if !current.is_empty()
            && current.len() + 1 + sentence.len() > chunk_size
        {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    if chunks.is_empty() {
        return vec![text.to_string()];
    }

    chunks
}

/// Title for the `index`-th chunk of a document.
///
/// The first chunk keeps the original title; later chunks get a
/// `" (part N)"` suffix so they stay distinguishable in result lists.
pub fn part_title(title: &str, index: usize) -> String {
    if index == 0 {
        title.to_string()
    } else {
        format!("{title} (part {})", index + 1)
    }
}
