//! Query and document tokenization
//!
//! Shared by the BM25 index, the query classifier, and the term-overlap
//! reranker so all three agree on term boundaries.

/// Tokenize text into lowercase terms.
///
/// Terms are maximal runs of alphanumeric characters and underscores, so
/// code identifiers like `parse_config` survive as single tokens. No
/// stemming or stopword removal is applied.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_alphanumeric() || ch == '_' {
            for lc in ch.to_lowercase() {
                current.push(lc);
            }
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}
