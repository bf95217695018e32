//! # Insights engine
//! Owns a lexicon and an [`EngineConfig`] and runs the whole text pipeline
//! (tokenize → score → vectorize → cluster → climate) plus the secondary
//! analytics. Pure and synchronous: callers decide where it runs.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::climate::{climate_from, compute_overall_climate, OverallClimate};
use crate::cluster::{kmeans, ClusterResult, KSelection};
use crate::config::EngineConfig;
use crate::form::{text_corpus_entries, FormSchema, ResponseRecord};
use crate::lexicon::Lexicon;
use crate::sentiment::{
    average_score, distribution_from_scores, SentimentAnalyzer, SentimentDistribution,
    SentimentResult,
};
use crate::stats::{
    assess_data_quality, numeric_question_stats, question_sentiment, sentiment_trend, themes,
    DataQuality, NumericQuestionStats, QuestionSentiment, SentimentTrend, Theme,
};
use crate::summary::{summarize, InsightsSummary};
use crate::tfidf::{self, VectorSpace};
use crate::tokenize::tokenize_with;

static BUILTIN: Lazy<InsightsEngine> = Lazy::new(InsightsEngine::default);

/// Short, stable identifier of a text corpus for logs. Never log raw answers.
pub fn corpus_fingerprint<S: AsRef<str>>(texts: &[S]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    for t in texts {
        hasher.update(t.as_ref().as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone)]
pub struct InsightsEngine {
    lexicon: Lexicon,
    config: EngineConfig,
}

impl Default for InsightsEngine {
    fn default() -> Self {
        Self::new(Lexicon::builtin().clone(), EngineConfig::default())
    }
}

impl InsightsEngine {
    pub fn new(lexicon: Lexicon, config: EngineConfig) -> Self {
        Self {
            lexicon,
            config: config.sanitized(),
        }
    }

    /// Build from a loaded config, reading `lexicon_path` when set.
    pub fn from_config(config: EngineConfig) -> Result<Self> {
        let lexicon = match &config.lexicon_path {
            Some(path) => Lexicon::load_from(path)
                .with_context(|| format!("loading lexicon for engine: {}", path.display()))?,
            None => Lexicon::builtin().clone(),
        };
        let (pos, neg, stop) = lexicon.sizes();
        info!(positive = pos, negative = neg, stopwords = stop, "insights engine ready");
        Ok(Self::new(lexicon, config))
    }

    /// Process-wide engine with the built-in lexicon and default config.
    pub fn builtin() -> &'static InsightsEngine {
        &BUILTIN
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyzer(&self) -> SentimentAnalyzer<'_> {
        SentimentAnalyzer::new(&self.lexicon, &self.config)
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize_with(text, &self.lexicon, self.config.min_token_chars)
    }

    pub fn sentiment(&self, text: &str) -> SentimentResult {
        self.analyzer().score(text)
    }

    pub fn sentiment_distribution<S: AsRef<str>>(&self, texts: &[S]) -> SentimentDistribution {
        self.analyzer().distribution(texts)
    }

    pub fn vectorize<S: AsRef<str>>(&self, texts: &[S]) -> VectorSpace {
        let docs: Vec<Vec<String>> = texts.iter().map(|t| self.tokenize(t.as_ref())).collect();
        tfidf::vectorize(&docs)
    }

    pub fn cluster<S: AsRef<str>>(&self, texts: &[S], selection: KSelection) -> Vec<ClusterResult> {
        let space = self.vectorize(texts);
        kmeans(&space, texts, selection, &self.config.kmeans)
    }

    pub fn overall_climate(&self, form: &FormSchema, responses: &[ResponseRecord]) -> OverallClimate {
        compute_overall_climate(self, form, responses)
    }

    pub fn summarize(&self, form: &FormSchema, responses: &[ResponseRecord]) -> InsightsSummary {
        summarize(form, responses, self.config.top_options)
    }

    /// Full report. Scores the corpus once and reuses the clusters for both
    /// the semantic axis and the themes.
    pub fn analyze(&self, form: &FormSchema, responses: &[ResponseRecord]) -> FormInsights {
        let cfg = &self.config;
        let entries = text_corpus_entries(form, responses);
        let texts: Vec<String> = entries.iter().map(|e| e.text.clone()).collect();
        let scored = self.analyzer().score_all(&texts);
        let sentiment = distribution_from_scores(&texts, &scored, cfg.exemplar_count);

        let clusters = (texts.len() >= cfg.axis_min_texts)
            .then(|| self.cluster(&texts, KSelection::Auto));
        let climate = climate_from(sentiment.distribution, clusters.as_deref(), cfg);

        let corpus_id = corpus_fingerprint(&texts);
        debug!(
            corpus = %corpus_id,
            responses = responses.len(),
            texts = texts.len(),
            clusters = clusters.as_ref().map_or(0, Vec::len),
            "form analyzed"
        );

        FormInsights {
            text_count: texts.len(),
            summary: self.summarize(form, responses),
            climate,
            average_sentiment: average_score(&scored),
            trend: sentiment_trend(responses, &entries, &scored),
            question_sentiment: question_sentiment(form, &entries, &scored),
            themes: clusters
                .map(|c| themes(&c, &scored))
                .unwrap_or_default(),
            numeric_questions: numeric_question_stats(form, responses),
            data_quality: assess_data_quality(responses, &texts),
            sentiment,
            corpus_id,
        }
    }
}

/// Everything the insights view shows for one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInsights {
    pub corpus_id: String,
    pub text_count: usize,
    pub summary: InsightsSummary,
    pub climate: OverallClimate,
    pub sentiment: SentimentDistribution,
    pub average_sentiment: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<SentimentTrend>,
    pub question_sentiment: Vec<QuestionSentiment>,
    pub themes: Vec<Theme>,
    pub numeric_questions: Vec<NumericQuestionStats>,
    pub data_quality: DataQuality,
}
