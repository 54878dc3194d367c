//! Tokenization and lexical scoring shared by the embedder, rerank and keyword selector

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const STOP_WORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "by", "can", "do", "does", "for", "from",
    "how", "i", "in", "is", "it", "of", "on", "or", "that", "the", "this", "to", "was", "what",
    "when", "where", "which", "who", "why", "will", "with",
];

fn word_pattern() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[\p{L}\p{N}]+").expect("word pattern is valid"))
}

/// Lowercased words of `text` without stop words, in order
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    word_pattern()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

pub(crate) fn term_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// Fraction of the query's terms that occur in `content`
pub(crate) fn keyword_score(query_terms: &HashSet<String>, content: &str) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    overlap_score(query_terms, &term_set(content))
}

/// Fraction of the query's terms that are in `content_terms`
pub(crate) fn overlap_score(query_terms: &HashSet<String>, content_terms: &HashSet<String>) -> f32 {
    if query_terms.is_empty() {
        return 0.0;
    }
    let matches = query_terms.intersection(content_terms).count();
    matches as f32 / query_terms.len() as f32
}
