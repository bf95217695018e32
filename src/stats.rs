//! Secondary analytics computed next to the climate: per-question sentiment,
//! sentiment trend over submission time, cluster themes, numeric question
//! statistics and a coarse data-quality grade.

use serde::{Deserialize, Serialize};

use crate::cluster::ClusterResult;
use crate::form::{CorpusEntry, FormSchema, ResponseRecord};
use crate::sentiment::{average_score, SentimentBreakdown, SentimentResult};

/// Change in mean sentiment (newer half minus older half) that counts as a trend.
pub const TREND_DELTA: f64 = 0.1;
/// Minimum timestamped responses with text before a trend is reported.
pub const TREND_MIN_RESPONSES: usize = 4;

const HIGH_QUALITY_CHARS: f64 = 200.0;
const LOW_QUALITY_CHARS: f64 = 50.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentPercentages {
    pub positive: u8,
    pub neutral: u8,
    pub negative: u8,
}

impl SentimentPercentages {
    pub fn of(b: &SentimentBreakdown) -> Self {
        let total = b.total();
        let pct = |n: usize| -> u8 {
            if total == 0 {
                0
            } else {
                (n as f64 / total as f64 * 100.0).round() as u8
            }
        };
        Self {
            positive: pct(b.positive),
            neutral: pct(b.neutral),
            negative: pct(b.negative),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSentiment {
    pub question_id: String,
    pub question_title: String,
    pub answers: usize,
    pub breakdown: SentimentBreakdown,
    pub percentages: SentimentPercentages,
    pub average_score: f64,
}

/// Sentiment per free-text question, in form order. `scored` is aligned
/// with `entries`.
pub fn question_sentiment(
    form: &FormSchema,
    entries: &[CorpusEntry<'_>],
    scored: &[SentimentResult],
) -> Vec<QuestionSentiment> {
    form.questions
        .iter()
        .filter(|q| q.kind.is_free_text())
        .map(|q| {
            let mine: Vec<SentimentResult> = entries
                .iter()
                .zip(scored)
                .filter(|(e, _)| e.question.id == q.id)
                .map(|(_, s)| *s)
                .collect();
            let breakdown: SentimentBreakdown = mine.iter().map(|s| s.label).collect();
            QuestionSentiment {
                question_id: q.id.clone(),
                question_title: q.title.clone(),
                answers: mine.len(),
                percentages: SentimentPercentages::of(&breakdown),
                breakdown,
                average_score: average_score(&mine),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentTrend {
    Improving,
    Stable,
    Declining,
}

/// Compare the mean per-response score of the older half of timestamped
/// responses with the newer half.
pub fn sentiment_trend(
    responses: &[ResponseRecord],
    entries: &[CorpusEntry<'_>],
    scored: &[SentimentResult],
) -> Option<SentimentTrend> {
    let mut per_response: Vec<(usize, f64)> = responses
        .iter()
        .enumerate()
        .filter(|(_, r)| r.submitted_at.is_some())
        .filter_map(|(ri, _)| {
            let mine: Vec<SentimentResult> = entries
                .iter()
                .zip(scored)
                .filter(|(e, _)| e.response_index == ri)
                .map(|(_, s)| *s)
                .collect();
            (!mine.is_empty()).then(|| (ri, average_score(&mine)))
        })
        .collect();

    if per_response.len() < TREND_MIN_RESPONSES {
        return None;
    }
    per_response.sort_by_key(|(ri, _)| responses[*ri].submitted_at);

    let mid = per_response.len() / 2;
    let mean = |xs: &[(usize, f64)]| xs.iter().map(|(_, s)| s).sum::<f64>() / xs.len() as f64;
    let delta = mean(&per_response[mid..]) - mean(&per_response[..mid]);

    Some(if delta > TREND_DELTA {
        SentimentTrend::Improving
    } else if delta < -TREND_DELTA {
        SentimentTrend::Declining
    } else {
        SentimentTrend::Stable
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub terms: Vec<String>,
    pub count: usize,
    /// Share of the corpus, rounded percent.
    pub percentage: u8,
    pub sentiment: SentimentBreakdown,
    pub samples: Vec<String>,
}

/// Annotate clusters with size and member sentiment. `scored` is aligned
/// with the clustered corpus.
pub fn themes(clusters: &[ClusterResult], scored: &[SentimentResult]) -> Vec<Theme> {
    let total = scored.len().max(1) as f64;
    clusters
        .iter()
        .map(|c| Theme {
            terms: c.terms.clone(),
            count: c.indices.len(),
            percentage: (c.indices.len() as f64 / total * 100.0).round() as u8,
            sentiment: c
                .indices
                .iter()
                .filter_map(|&i| scored.get(i))
                .map(|s| s.label)
                .collect(),
            samples: c.samples.clone(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveStats {
    pub mean: f64,
    pub median: f64,
    pub mode: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Mean, median, mode (first-seen on ties), population standard deviation,
/// min and max. Mean, median and std-dev are rounded to two decimals.
pub fn descriptive_stats(values: &[f64]) -> DescriptiveStats {
    if values.is_empty() {
        return DescriptiveStats::default();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let len = sorted.len();
    let median = if len % 2 == 0 {
        (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
    } else {
        sorted[len / 2]
    };

    let mut freq: Vec<(f64, usize)> = Vec::new();
    for &v in values {
        match freq.iter_mut().find(|(x, _)| *x == v) {
            Some((_, c)) => *c += 1,
            None => freq.push((v, 1)),
        }
    }
    let mut mode = freq[0];
    for &f in &freq[1..] {
        if f.1 > mode.1 {
            mode = f;
        }
    }

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    DescriptiveStats {
        mean: round2(mean),
        median: round2(median),
        mode: mode.0,
        std_dev: round2(variance.sqrt()),
        min: sorted[0],
        max: sorted[len - 1],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericQuestionStats {
    pub question_id: String,
    pub question_title: String,
    pub count: usize,
    pub stats: DescriptiveStats,
}

/// Statistics for every number/rating question, in form order.
pub fn numeric_question_stats(
    form: &FormSchema,
    responses: &[ResponseRecord],
) -> Vec<NumericQuestionStats> {
    form.questions
        .iter()
        .filter(|q| q.kind.is_numeric())
        .map(|q| {
            let values: Vec<f64> = responses
                .iter()
                .filter_map(|r| r.value_for(&q.id)?.as_number())
                .collect();
            NumericQuestionStats {
                question_id: q.id.clone(),
                question_title: q.title.clone(),
                count: values.len(),
                stats: descriptive_stats(&values),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextQuality {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub total_responses: usize,
    pub valid_text_answers: usize,
    /// Mean free-text answer length in chars, rounded.
    pub average_answer_length: usize,
    pub text_quality: TextQuality,
}

pub fn assess_data_quality<S: AsRef<str>>(responses: &[ResponseRecord], texts: &[S]) -> DataQuality {
    let total_chars: usize = texts.iter().map(|t| t.as_ref().chars().count()).sum();
    let avg = if texts.is_empty() {
        0.0
    } else {
        total_chars as f64 / texts.len() as f64
    };
    let text_quality = if avg > HIGH_QUALITY_CHARS {
        TextQuality::High
    } else if avg < LOW_QUALITY_CHARS {
        TextQuality::Low
    } else {
        TextQuality::Medium
    };
    DataQuality {
        total_responses: responses.len(),
        valid_text_answers: texts.len(),
        average_answer_length: avg.round() as usize,
        text_quality,
    }
}
