// src/lib.rs
// Public library surface: the pure analysis core, the HTTP router and the
// free-function entry points backed by the built-in engine.

pub mod api;
pub mod climate;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod form;
pub mod lexicon;
pub mod metrics;
pub mod sentiment;
pub mod stats;
pub mod summary;
pub mod tfidf;
pub mod tokenize;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::climate::{OverallClimate, SemanticAxis};
pub use crate::cluster::{ClusterResult, KSelection};
pub use crate::config::EngineConfig;
pub use crate::engine::{FormInsights, InsightsEngine};
pub use crate::form::{Answer, AnswerValue, FormSchema, Question, QuestionType, ResponseRecord};
pub use crate::lexicon::Lexicon;
pub use crate::sentiment::{
    SentimentBreakdown, SentimentDistribution, SentimentLabel, SentimentResult,
};
pub use crate::summary::{InsightsSummary, TopOption};
pub use crate::tokenize::tokenize;

/// Score a single text with the built-in lexicon.
pub fn compute_sentiment(text: &str) -> SentimentResult {
    InsightsEngine::builtin().sentiment(text)
}

pub fn sentiment_distribution<S: AsRef<str>>(texts: &[S]) -> SentimentDistribution {
    InsightsEngine::builtin().sentiment_distribution(texts)
}

/// Cluster raw texts. `auto_k` picks k from the corpus size; otherwise
/// `fixed_k` (at least 1) is used.
pub fn kmeans_cluster<S: AsRef<str>>(texts: &[S], auto_k: bool, fixed_k: usize) -> Vec<ClusterResult> {
    InsightsEngine::builtin().cluster(texts, KSelection::from_flags(auto_k, fixed_k))
}

pub fn compute_overall_climate(form: &FormSchema, responses: &[ResponseRecord]) -> OverallClimate {
    InsightsEngine::builtin().overall_climate(form, responses)
}

pub fn summarize(form: &FormSchema, responses: &[ResponseRecord]) -> InsightsSummary {
    InsightsEngine::builtin().summarize(form, responses)
}

/// Router plus `/metrics`, as served by the binary.
pub fn app(engine: InsightsEngine) -> anyhow::Result<shuttle_axum::axum::Router> {
    let metrics = metrics::Metrics::init()?;
    Ok(router(AppState::new(engine)).merge(metrics.router()))
}
