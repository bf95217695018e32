//! Overall response climate: positivity gauge, sentiment breakdown,
//! dominant tendency and an optional semantic axis.
//!
//! Positivity = `(positive + 0.5 * neutral) / total * 100`, rounded.
//! Tendency  = `(positive - negative) / total`, labelled with a 0.2 dead zone.
//!
//! The axis poles are the top terms of the first two clusters. Nothing ties
//! the left pole to negative polarity; it is an unordered pair of topic
//! signatures placed on the tendency slider.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cluster::{ClusterResult, KSelection};
use crate::config::EngineConfig;
use crate::engine::{corpus_fingerprint, InsightsEngine};
use crate::form::{text_corpus, FormSchema, ResponseRecord};
use crate::sentiment::{SentimentBreakdown, SentimentLabel};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticAxis {
    pub left: String,
    pub right: String,
    /// In `[0, 1]`.
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallClimate {
    /// In `[0, 100]`.
    pub positivity_score: u8,
    pub sentiment_breakdown: SentimentBreakdown,
    pub dominant_tendency: SentimentLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_axis: Option<SemanticAxis>,
}

impl OverallClimate {
    /// Reported when there is no text at all: do not imply any sentiment.
    pub fn neutral_prior() -> Self {
        Self {
            positivity_score: 50,
            sentiment_breakdown: SentimentBreakdown::default(),
            dominant_tendency: SentimentLabel::Neutral,
            semantic_axis: None,
        }
    }
}

impl Default for OverallClimate {
    fn default() -> Self {
        Self::neutral_prior()
    }
}

pub fn positivity_score(b: &SentimentBreakdown, neutral_weight: f64) -> u8 {
    let total = b.total();
    if total == 0 {
        return 50;
    }
    let pct = (b.positive as f64 + b.neutral as f64 * neutral_weight) / total as f64 * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Positive/negative balance in `[-1, 1]`.
pub fn tendency_value(b: &SentimentBreakdown) -> f64 {
    let total = b.total();
    if total == 0 {
        return 0.0;
    }
    (b.positive as f64 - b.negative as f64) / total as f64
}

/// Axis from the first two clusters, `None` with fewer than two.
pub fn semantic_axis(clusters: &[ClusterResult], tendency: f64, terms: usize) -> Option<SemanticAxis> {
    match clusters {
        [first, second, ..] => Some(SemanticAxis {
            left: pole_label(first, terms),
            right: pole_label(second, terms),
            position: ((tendency + 1.0) / 2.0).clamp(0.0, 1.0),
        }),
        _ => None,
    }
}

fn pole_label(c: &ClusterResult, terms: usize) -> String {
    c.terms
        .iter()
        .take(terms)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("/")
}

/// Compose the climate from a breakdown and (optionally) the corpus clusters.
pub fn climate_from(
    breakdown: SentimentBreakdown,
    clusters: Option<&[ClusterResult]>,
    cfg: &EngineConfig,
) -> OverallClimate {
    if breakdown.total() == 0 {
        return OverallClimate::neutral_prior();
    }
    let tendency = tendency_value(&breakdown);
    OverallClimate {
        positivity_score: positivity_score(&breakdown, cfg.neutral_weight),
        sentiment_breakdown: breakdown,
        dominant_tendency: SentimentLabel::from_value(tendency, cfg.tendency_threshold),
        semantic_axis: clusters.and_then(|c| semantic_axis(c, tendency, cfg.axis_terms)),
    }
}

pub fn compute_overall_climate(
    engine: &InsightsEngine,
    form: &FormSchema,
    responses: &[ResponseRecord],
) -> OverallClimate {
    let texts = text_corpus(form, responses);
    if texts.is_empty() {
        debug!(responses = responses.len(), "no free-text answers; neutral climate");
        return OverallClimate::neutral_prior();
    }

    let cfg = engine.config();
    let dist = engine.sentiment_distribution(&texts);
    let clusters = (texts.len() >= cfg.axis_min_texts)
        .then(|| engine.cluster(&texts, KSelection::Auto));

    let climate = climate_from(dist.distribution, clusters.as_deref(), cfg);
    debug!(
        corpus = %corpus_fingerprint(&texts),
        texts = texts.len(),
        positivity = climate.positivity_score,
        tendency = climate.dominant_tendency.as_str(),
        axis = climate.semantic_axis.is_some(),
        "climate computed"
    );
    climate
}
