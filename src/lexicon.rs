//! Bilingual (English / Polish) word lists used by the tokenizer and the
//! sentiment scorer.
//!
//! The built-in copy is compiled in from `config/lexicon.toml`; a different
//! file with the same shape can be loaded with [`Lexicon::load_from`].

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{collections::HashSet, fs, path::Path};

static BUILTIN: Lazy<Lexicon> = Lazy::new(|| {
    let raw = include_str!("../config/lexicon.toml");
    Lexicon::from_toml_str(raw).expect("valid built-in lexicon")
});

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    positive: HashSet<String>,
    negative: HashSet<String>,
    stopwords: HashSet<String>,
}

#[derive(Deserialize)]
struct LexiconFile {
    #[serde(default)]
    positive: Vec<String>,
    #[serde(default)]
    negative: Vec<String>,
    #[serde(default)]
    stopwords: Vec<String>,
}

impl Lexicon {
    /// Shared built-in lexicon.
    pub fn builtin() -> &'static Lexicon {
        &BUILTIN
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(s).context("parsing lexicon TOML")?;
        Ok(Self {
            positive: clean_set(file.positive),
            negative: clean_set(file.negative),
            stopwords: clean_set(file.stopwords),
        })
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid lexicon at {}", path.display()))
    }

    /// Builder used by tests and callers assembling a lexicon in code.
    pub fn from_words<I, S>(positive: I, negative: I, stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let conv = |it: I| clean_set(it.into_iter().map(Into::into).collect());
        Self {
            positive: conv(positive),
            negative: conv(negative),
            stopwords: conv(stopwords),
        }
    }

    #[inline]
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    #[inline]
    pub fn is_positive(&self, token: &str) -> bool {
        self.positive.contains(token)
    }

    #[inline]
    pub fn is_negative(&self, token: &str) -> bool {
        self.negative.contains(token)
    }

    /// Signed contribution of a token: +1 positive, -1 negative.
    /// A word listed in both sets contributes 0.
    pub fn word_score(&self, token: &str) -> i32 {
        let mut s = 0;
        if self.is_positive(token) {
            s += 1;
        }
        if self.is_negative(token) {
            s -= 1;
        }
        s
    }

    pub fn sizes(&self) -> (usize, usize, usize) {
        (self.positive.len(), self.negative.len(), self.stopwords.len())
    }
}

fn clean_set(items: Vec<String>) -> HashSet<String> {
    items
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
