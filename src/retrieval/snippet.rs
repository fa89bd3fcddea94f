//! Snippet extraction for search result citations
//!
//! Extracts the most query-relevant sentence(s) from document content to
//! provide focused citation snippets instead of full documents.

use super::tokenize::tokenize;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Extract the best-matching snippet from content for a given query.
///
/// Splits content into sentences, scores each by query term overlap, and
/// returns the highest-scoring sentence(s) up to `max_chars`. Falls back to
/// the first sentence if no term overlap is found.
pub fn extract_snippet(query: &str, content: &str, max_chars: usize) -> Option<String> {
    if content.is_empty() || query.is_empty() {
        return None;
    }

    let sentences = split_sentences(content);
    if sentences.is_empty() {
        return None;
    }

    let query_terms: HashSet<String> = tokenize(query).into_iter().collect();
    if query_terms.is_empty() {
        return Some(truncate_to_chars(&sentences[0], max_chars));
    }

    let scored: Vec<(usize, f32)> = sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| {
            let sentence_terms: HashSet<String> = tokenize(sentence).into_iter().collect();
            let overlap = query_terms.intersection(&sentence_terms).count();
            (i, overlap as f32 / query_terms.len() as f32)
        })
        .collect();

    let has_match = scored.iter().any(|(_, s)| *s > 0.0);
    let result = if has_match {
        // Best sentences first; prefer earlier sentences on ties
        let mut sorted = scored;
        sorted.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let mut buf = String::new();
        for (idx, score) in &sorted {
            // Only sentences that actually share query terms may join
            if *score == 0.0 {
                break;
            }
            let sentence = &sentences[*idx];
            if buf.is_empty() {
                buf = sentence.to_string();
            } else if buf.len() + sentence.len() + 1 <= max_chars {
                buf.push(' ');
                buf.push_str(sentence);
            } else {
                break;
            }
        }
        buf
    } else {
        sentences[0].clone()
    };

    Some(truncate_to_chars(&result, max_chars))
}

/// Split text into sentences on `.!?` boundaries and blank lines.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();

    for paragraph in text.split("\n\n") {
        let mut current = String::new();
        let chars: Vec<char> = paragraph.chars().collect();
        let len = chars.len();

        for i in 0..len {
            current.push(chars[i]);
            let is_terminal = matches!(chars[i], '.' | '!' | '?');
            let at_end = i + 1 == len;
            let followed_by_space = i + 1 < len && chars[i + 1].is_whitespace();

            if is_terminal && (at_end || followed_by_space) {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    sentences.push(trimmed);
                }
                current.clear();
            }
        }

        let trimmed = current.trim().to_string();
        if !trimmed.is_empty() {
            sentences.push(trimmed);
        }
    }

    sentences
}

/// Truncate to a character budget, appending an ellipsis when cut.
fn truncate_to_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_sentence_with_query_terms() {
        let content = "Cats sleep most of the day. BM25 ranks documents by term \
                       frequency. The weather was pleasant.";
        let snippet = extract_snippet("bm25 ranking", content, 200).unwrap();
        assert!(snippet.contains("BM25"));
        assert!(!snippet.contains("weather"));
    }

    #[test]
    fn test_falls_back_to_first_sentence() {
        let content = "Opening statement here. Second sentence follows.";
        let snippet = extract_snippet("unrelated terms", content, 200).unwrap();
        assert_eq!(snippet, "Opening statement here.");
    }

    #[test]
    fn test_empty_inputs_return_none() {
        assert!(extract_snippet("", "content", 100).is_none());
        assert!(extract_snippet("query", "", 100).is_none());
    }

    #[test]
    fn test_respects_char_budget() {
        let long = "relevance ".repeat(50);
        let snippet = extract_snippet("relevance", &long, 40).unwrap();
        assert!(snippet.chars().count() <= 40);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_blank_lines_split_sentences() {
        let content = "First paragraph without terminal punctuation\n\nSecond block mentions fusion";
        let snippet = extract_snippet("fusion", content, 200).unwrap();
        assert_eq!(snippet, "Second block mentions fusion");
    }

    #[test]
    fn test_irrelevant_sentences_never_pad_the_snippet() {
        // Plenty of budget left after the matching sentence; the others
        // must still be excluded
        let content = "Fusion merges ranked lists. Lunch is at noon. The printer is broken.";
        let snippet = extract_snippet("fusion", content, 500).unwrap();
        assert_eq!(snippet, "Fusion merges ranked lists.");
    }

    #[test]
    fn test_multiple_matching_sentences_may_combine() {
        let content = "Fusion merges lists. Unrelated filler sentence. Fusion needs ranks.";
        let snippet = extract_snippet("fusion", content, 500).unwrap();
        assert!(snippet.contains("Fusion merges lists."));
        assert!(snippet.contains("Fusion needs ranks."));
        assert!(!snippet.contains("filler"));
    }

    #[test]
    fn test_split_sentences_basic() {
        let sentences = split_sentences("One. Two! Three? Four");
        assert_eq!(sentences, vec!["One.", "Two!", "Three?", "Four"]);
    }
}
