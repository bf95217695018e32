//! Unicode-aware tokenizer shared by the sentiment scorer and the TF-IDF
//! vectorizer.
//!
//! Lowercase, collapse every run of non-letter/non-digit characters into a
//! single space, split on whitespace, then drop short tokens and stopwords.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexicon::Lexicon;

/// Minimum token length (in chars) used by the built-in engine.
pub const DEFAULT_MIN_TOKEN_CHARS: usize = 2;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("separator regex"));

/// Tokenize with the built-in lexicon's stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, Lexicon::builtin(), DEFAULT_MIN_TOKEN_CHARS)
}

/// Tokenize with an explicit stopword source and minimum token length.
pub fn tokenize_with(text: &str, lexicon: &Lexicon, min_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let lowered = text.to_lowercase();
    let spaced = SEPARATORS.replace_all(&lowered, " ");
    spaced
        .split_whitespace()
        .filter(|t| t.chars().count() >= min_chars)
        .filter(|t| !lexicon.is_stopword(t))
        .map(str::to_string)
        .collect()
}
