//! Lexicon sentiment: per-text polarity score and corpus-level distribution.
//!
//! Linear bag-of-words heuristic. Each token adds +1 (positive list) or -1
//! (negative list); the sum is divided by `max(1, tokens / 5)` and clamped
//! to `[-1, 1]`. Labels use a symmetric 0.2 dead zone.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::config::EngineConfig;
use crate::lexicon::Lexicon;
use crate::tokenize::tokenize_with;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    /// Symmetric dead-zone labelling shared by texts and tendencies.
    pub fn from_value(value: f64, threshold: f64) -> Self {
        if value > threshold {
            SentimentLabel::Positive
        } else if value < -threshold {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    /// In `[-1, 1]`.
    pub score: f64,
    pub label: SentimentLabel,
}

impl SentimentResult {
    pub const NEUTRAL: SentimentResult = SentimentResult {
        score: 0.0,
        label: SentimentLabel::Neutral,
    };
}

/// Counts per label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentBreakdown {
    pub fn record(&mut self, label: SentimentLabel) {
        match label {
            SentimentLabel::Positive => self.positive += 1,
            SentimentLabel::Neutral => self.neutral += 1,
            SentimentLabel::Negative => self.negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

impl FromIterator<SentimentLabel> for SentimentBreakdown {
    fn from_iter<T: IntoIterator<Item = SentimentLabel>>(iter: T) -> Self {
        let mut b = SentimentBreakdown::default();
        for label in iter {
            b.record(label);
        }
        b
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentDistribution {
    pub distribution: SentimentBreakdown,
    /// Highest-scoring positive texts, input order on ties.
    pub top_positive: Vec<String>,
    /// Lowest-scoring negative texts, input order on ties.
    pub top_negative: Vec<String>,
}

/// Scores texts against a lexicon with the thresholds of an `EngineConfig`.
#[derive(Debug, Clone, Copy)]
pub struct SentimentAnalyzer<'a> {
    lexicon: &'a Lexicon,
    cfg: &'a EngineConfig,
}

impl<'a> SentimentAnalyzer<'a> {
    pub fn new(lexicon: &'a Lexicon, cfg: &'a EngineConfig) -> Self {
        Self { lexicon, cfg }
    }

    /// Raw lexicon sum and the number of tokens it was computed over.
    pub fn score_text(&self, text: &str) -> (i32, usize) {
        let tokens = tokenize_with(text, self.lexicon, self.cfg.min_token_chars);
        let raw = tokens.iter().map(|t| self.lexicon.word_score(t)).sum();
        (raw, tokens.len())
    }

    pub fn score(&self, text: &str) -> SentimentResult {
        let (raw, n) = self.score_text(text);
        if n == 0 {
            return SentimentResult::NEUTRAL;
        }
        let norm = (n as f64 / self.cfg.length_norm_words).max(1.0);
        let score = (raw as f64 / norm).clamp(-1.0, 1.0);
        SentimentResult {
            score,
            label: SentimentLabel::from_value(score, self.cfg.label_threshold),
        }
    }

    pub fn score_all<S: AsRef<str>>(&self, texts: &[S]) -> Vec<SentimentResult> {
        texts.iter().map(|t| self.score(t.as_ref())).collect()
    }

    pub fn distribution<S: AsRef<str>>(&self, texts: &[S]) -> SentimentDistribution {
        let scored = self.score_all(texts);
        distribution_from_scores(texts, &scored, self.cfg.exemplar_count)
    }
}

/// Tally labels and pick exemplars from already-scored texts.
pub(crate) fn distribution_from_scores<S: AsRef<str>>(
    texts: &[S],
    scored: &[SentimentResult],
    exemplars: usize,
) -> SentimentDistribution {
    let distribution: SentimentBreakdown = scored.iter().map(|s| s.label).collect();

    let pick = |label: SentimentLabel, order: fn(f64, f64) -> Ordering| -> Vec<String> {
        let mut hits: Vec<(usize, f64)> = scored
            .iter()
            .enumerate()
            .filter(|(_, s)| s.label == label)
            .map(|(i, s)| (i, s.score))
            .collect();
        // stable: equal scores keep input order
        hits.sort_by(|a, b| order(a.1, b.1));
        hits.into_iter()
            .take(exemplars)
            .map(|(i, _)| texts[i].as_ref().to_string())
            .collect()
    };

    SentimentDistribution {
        distribution,
        top_positive: pick(SentimentLabel::Positive, |a, b| b.total_cmp(&a)),
        top_negative: pick(SentimentLabel::Negative, |a, b| a.total_cmp(&b)),
    }
}

/// Mean of the scores, 0 for none.
pub fn average_score(scored: &[SentimentResult]) -> f64 {
    if scored.is_empty() {
        return 0.0;
    }
    scored.iter().map(|s| s.score).sum::<f64>() / scored.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SentimentAnalyzer<'static> {
        static CFG: once_cell::sync::Lazy<EngineConfig> =
            once_cell::sync::Lazy::new(EngineConfig::default);
        SentimentAnalyzer::new(Lexicon::builtin(), &CFG)
    }

    #[test]
    fn empty_text_is_neutral_zero() {
        let r = analyzer().score("");
        assert_eq!(r, SentimentResult::NEUTRAL);
    }

    #[test]
    fn positive_only_words_are_positive() {
        let r = analyzer().score("good great excellent love");
        assert!(r.score > 0.0);
        assert_eq!(r.label, SentimentLabel::Positive);
        // 4 hits over 4 tokens: norm = max(1, 0.8) = 1 -> clamp(4) = 1
        assert!((r.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn negative_mirror_flips_sign() {
        let a = analyzer();
        let pos = a.score("fast clear helpful service overall today");
        let neg = a.score("slow confusing awful service overall today");
        assert!((pos.score + neg.score).abs() < 1e-12);
        assert_eq!(pos.label, SentimentLabel::Positive);
        assert_eq!(neg.label, SentimentLabel::Negative);
    }

    #[test]
    fn long_text_is_length_normalized() {
        // 10 tokens, one positive -> 1 / (10 / 5) = 0.5
        let r = analyzer().score("good alpha beta gamma delta epsilon zeta theta kappa lambda");
        assert!((r.score - 0.5).abs() < 1e-12);
        assert_eq!(r.label, SentimentLabel::Positive);

        // 15 tokens, one positive -> 1 / 3 ~ 0.333
        let r = analyzer().score(
            "good one1 two2 three3 four4 five5 six6 seven7 eight8 nine9 ten10 eleven twelve thirteen fourteen",
        );
        assert!((r.score - 1.0 / 3.0).abs() < 1e-12);

        // 30 tokens, one positive -> 1 / 6 ~ 0.167 -> neutral
        let filler = (0..29).map(|i| format!("w{i}x")).collect::<Vec<_>>().join(" ");
        let r = analyzer().score(&format!("good {filler}"));
        assert_eq!(r.label, SentimentLabel::Neutral);
    }

    #[test]
    fn mixed_words_cancel() {
        let r = analyzer().score("good but slow");
        assert_eq!(r.score, 0.0);
        assert_eq!(r.label, SentimentLabel::Neutral);
    }

    #[test]
    fn distribution_counts_and_exemplars() {
        let texts = vec![
            "great",                                         // +1
            "bad",                                           // -1
            "nothing special here",                          // 0
            "good product overall, but slightly slow sometimes", // 0 -> neutral
            "love",                                          // +1
            "awesome",                                       // +1
            "excellent",                                     // +1
            "terrible awful",                                // -1 (clamped)
        ];
        let d = analyzer().distribution(&texts);
        assert_eq!(d.distribution.positive, 4);
        assert_eq!(d.distribution.negative, 2);
        assert_eq!(d.distribution.neutral, 2);
        assert_eq!(d.distribution.total(), texts.len());
        // all positives tie at 1.0 -> first three in input order
        assert_eq!(d.top_positive, vec!["great", "love", "awesome"]);
        assert_eq!(d.top_negative, vec!["bad", "terrible awful"]);
    }

    #[test]
    fn labels_serialize_lowercase() {
        let v = serde_json::to_value(SentimentLabel::Negative).unwrap();
        assert_eq!(v, serde_json::json!("negative"));
        assert_eq!(SentimentLabel::from_value(0.2, 0.2), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_value(-0.21, 0.2), SentimentLabel::Negative);
    }

    #[test]
    fn average_of_empty_is_zero() {
        assert_eq!(average_score(&[]), 0.0);
    }
}
