//! Form schema and response records as delivered by the forms backend.
//!
//! Answers arrive as loosely typed JSON (string, string array, number,
//! boolean or null). They are held in [`AnswerValue`] and interpreted by the
//! declared [`QuestionType`] of the question they answer, never by shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Text,
    Textarea,
    MultipleChoice,
    Checkbox,
    Dropdown,
    Email,
    Number,
    Date,
    Time,
    Rating,
    #[serde(other)]
    Other,
}

impl QuestionType {
    /// Free-text questions feed the text corpus.
    pub fn is_free_text(&self) -> bool {
        matches!(self, QuestionType::Text | QuestionType::Textarea)
    }

    /// Categorical questions feed the option tallies.
    pub fn is_choice(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoice | QuestionType::Dropdown | QuestionType::Checkbox
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, QuestionType::Number | QuestionType::Rating)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl Question {
    pub fn new(id: impl Into<String>, title: impl Into<String>, kind: QuestionType) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            options: Vec::new(),
            required: false,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl FormSchema {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            id: None,
            title: String::new(),
            questions,
        }
    }
}

/// One answer value as sent by the client.
///
/// Any JSON shape is accepted. Array elements are stringified (nested
/// values as JSON text, nulls dropped); objects land in
/// [`AnswerValue::Unsupported`] and count as unanswered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "Value")]
pub enum AnswerValue {
    Text(String),
    Choices(Vec<String>),
    Number(f64),
    Flag(bool),
    Unsupported,
}

impl From<Value> for AnswerValue {
    fn from(v: Value) -> Self {
        match v {
            Value::String(s) => AnswerValue::Text(s),
            Value::Bool(b) => AnswerValue::Flag(b),
            Value::Number(n) => n.as_f64().map_or(AnswerValue::Unsupported, AnswerValue::Number),
            Value::Array(items) => AnswerValue::Choices(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(s) => Some(s),
                        Value::Null => None,
                        other => Some(other.to_string()),
                    })
                    .collect(),
            ),
            Value::Null | Value::Object(_) => AnswerValue::Unsupported,
        }
    }
}

impl AnswerValue {
    /// Empty strings and empty arrays count as unanswered.
    pub fn is_answered(&self) -> bool {
        match self {
            AnswerValue::Text(s) => !s.is_empty(),
            AnswerValue::Choices(v) => !v.is_empty(),
            AnswerValue::Number(_) | AnswerValue::Flag(_) => true,
            AnswerValue::Unsupported => false,
        }
    }

    /// `false`, zero and empty values never reach the text corpus.
    pub fn is_falsy(&self) -> bool {
        match self {
            AnswerValue::Number(n) => *n == 0.0 || n.is_nan(),
            AnswerValue::Flag(b) => !b,
            AnswerValue::Text(s) => s.is_empty(),
            AnswerValue::Choices(_) => false,
            AnswerValue::Unsupported => true,
        }
    }

    /// Coerce to text for free-text questions.
    pub fn to_text(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Choices(v) => v.join(","),
            AnswerValue::Number(n) => n.to_string(),
            AnswerValue::Flag(b) => b.to_string(),
            AnswerValue::Unsupported => String::new(),
        }
    }

    /// Selected option labels for choice questions.
    pub fn selections(&self) -> Vec<String> {
        match self {
            AnswerValue::Choices(v) => v.clone(),
            AnswerValue::Text(s) if s.is_empty() => Vec::new(),
            AnswerValue::Unsupported => Vec::new(),
            other => vec![other.to_text()],
        }
    }

    /// Numeric reading for number/rating questions.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) if n.is_finite() => Some(*n),
            AnswerValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        AnswerValue::Number(n)
    }
}

impl From<bool> for AnswerValue {
    fn from(b: bool) -> Self {
        AnswerValue::Flag(b)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(v: Vec<&str>) -> Self {
        AnswerValue::Choices(v.into_iter().map(str::to_string).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: String,
    /// `None` for JSON null or a missing value.
    #[serde(default)]
    pub value: Option<AnswerValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ResponseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and fixtures.
    pub fn answer(mut self, question_id: impl Into<String>, value: impl Into<AnswerValue>) -> Self {
        self.answers.push(Answer {
            question_id: question_id.into(),
            value: Some(value.into()),
        });
        self
    }

    pub fn submitted(mut self, at: DateTime<Utc>) -> Self {
        self.submitted_at = Some(at);
        self
    }

    /// Value for a question; with duplicate entries the last one wins.
    pub fn value_for(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .rev()
            .find(|a| a.question_id == question_id)
            .and_then(|a| a.value.as_ref())
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.value_for(question_id)
            .is_some_and(AnswerValue::is_answered)
    }

    /// Trimmed, non-empty text answer to a question. Falsy values (`0`,
    /// `false`) are skipped rather than stringified.
    pub fn text_for(&self, question_id: &str) -> Option<String> {
        let value = self.value_for(question_id).filter(|v| !v.is_falsy())?;
        let s = value.to_text();
        let t = s.trim();
        (!t.is_empty()).then(|| t.to_string())
    }
}

/// One corpus entry with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusEntry<'a> {
    pub question: &'a Question,
    pub response_index: usize,
    pub text: String,
}

/// Non-empty, trimmed free-text answers in (question, response) order.
pub fn text_corpus_entries<'a>(
    form: &'a FormSchema,
    responses: &[ResponseRecord],
) -> Vec<CorpusEntry<'a>> {
    let mut out = Vec::new();
    for q in form.questions.iter().filter(|q| q.kind.is_free_text()) {
        for (ri, r) in responses.iter().enumerate() {
            if let Some(text) = r.text_for(&q.id) {
                out.push(CorpusEntry {
                    question: q,
                    response_index: ri,
                    text,
                });
            }
        }
    }
    out
}

pub fn text_corpus(form: &FormSchema, responses: &[ResponseRecord]) -> Vec<String> {
    text_corpus_entries(form, responses)
        .into_iter()
        .map(|e| e.text)
        .collect()
}
