//! Insight summary over categorical answers and completion ratios.
//! Independent of the text pipeline.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::form::{FormSchema, ResponseRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopOption {
    pub option: String,
    pub question_title: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsSummary {
    pub response_count: usize,
    /// In `[0, 100]`.
    pub completion_avg_pct: u8,
    pub top_options: Vec<TopOption>,
}

/// Average share of questions answered per response, as a rounded percentage.
/// No responses -> 0.
pub fn completion_avg_pct(form: &FormSchema, responses: &[ResponseRecord]) -> u8 {
    if responses.is_empty() {
        return 0;
    }
    let total_questions = form.questions.len().max(1);
    let answered: usize = responses
        .iter()
        .map(|r| {
            form.questions
                .iter()
                .filter(|q| r.is_answered(&q.id))
                .count()
        })
        .sum();
    let pct = answered as f64 / (responses.len() * total_questions) as f64 * 100.0;
    pct.round().clamp(0.0, 100.0) as u8
}

/// Tally selected options of choice questions; each checkbox selection counts
/// once. Sorted by count descending, first-encountered first on ties.
pub fn top_options(form: &FormSchema, responses: &[ResponseRecord], limit: usize) -> Vec<TopOption> {
    // (question index, option) -> slot in `tally`
    let mut slots: HashMap<(usize, String), usize> = HashMap::new();
    let mut tally: Vec<TopOption> = Vec::new();

    for (qi, q) in form.questions.iter().enumerate() {
        if !q.kind.is_choice() {
            continue;
        }
        for r in responses {
            let Some(value) = r.value_for(&q.id) else {
                continue;
            };
            for option in value.selections() {
                let slot = *slots.entry((qi, option.clone())).or_insert_with(|| {
                    tally.push(TopOption {
                        option,
                        question_title: q.title.clone(),
                        count: 0,
                    });
                    tally.len() - 1
                });
                tally[slot].count += 1;
            }
        }
    }

    tally.sort_by(|a, b| b.count.cmp(&a.count));
    tally.truncate(limit);
    tally
}

pub fn summarize(form: &FormSchema, responses: &[ResponseRecord], limit: usize) -> InsightsSummary {
    InsightsSummary {
        response_count: responses.len(),
        completion_avg_pct: completion_avg_pct(form, responses),
        top_options: top_options(form, responses, limit),
    }
}
