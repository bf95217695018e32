use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::climate::OverallClimate;
use crate::cluster::{ClusterResult, KSelection};
use crate::engine::{FormInsights, InsightsEngine};
use crate::form::{text_corpus_entries, FormSchema, ResponseRecord};
use crate::metrics;
use crate::sentiment::{SentimentDistribution, SentimentResult};
use crate::summary::InsightsSummary;

#[derive(Clone, Default)]
pub struct AppState {
    engine: Arc<InsightsEngine>,
}

impl AppState {
    pub fn new(engine: InsightsEngine) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/tokenize", post(tokenize))
        .route("/sentiment", post(sentiment))
        .route("/sentiment/distribution", post(distribution))
        .route("/clusters", post(clusters))
        .route("/climate", post(climate))
        .route("/summary", post(summary))
        .route("/insights", post(insights))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Background computation that did not finish (panicked or was cancelled).
#[derive(Debug)]
pub struct ComputeFailed;

impl IntoResponse for ComputeFailed {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, "analysis failed").into_response()
    }
}

#[derive(Deserialize)]
struct TextReq {
    text: String,
}

#[derive(Deserialize)]
struct TextsReq {
    #[serde(default)]
    texts: Vec<String>,
}

#[derive(Deserialize)]
struct ClustersReq {
    #[serde(default)]
    texts: Vec<String>,
    /// Absent means automatic k.
    #[serde(default)]
    k: Option<usize>,
}

#[derive(Deserialize)]
struct FormReq {
    form: FormSchema,
    #[serde(default)]
    responses: Vec<ResponseRecord>,
}

impl FormReq {
    fn corpus_len(&self) -> usize {
        text_corpus_entries(&self.form, &self.responses).len()
    }
}

#[derive(Serialize)]
struct TokensResp {
    tokens: Vec<String>,
}

/// Run `f` against the engine, on the blocking pool once the corpus reaches
/// `offload_threshold` texts.
async fn run_engine<T, F>(
    state: &AppState,
    endpoint: &'static str,
    texts: usize,
    f: F,
) -> Result<T, ComputeFailed>
where
    F: FnOnce(&InsightsEngine) -> T + Send + 'static,
    T: Send + 'static,
{
    metrics::record_request(endpoint);
    let started = Instant::now();

    let out = if texts >= state.engine.config().offload_threshold {
        metrics::record_offload();
        let engine = Arc::clone(&state.engine);
        tokio::task::spawn_blocking(move || f(&engine))
            .await
            .map_err(|e| {
                warn!(endpoint, texts, error = %e, "background analysis failed");
                ComputeFailed
            })?
    } else {
        f(&state.engine)
    };

    metrics::observe_corpus(texts, started.elapsed().as_secs_f64() * 1000.0);
    Ok(out)
}

async fn tokenize(State(state): State<AppState>, Json(body): Json<TextReq>) -> Json<TokensResp> {
    metrics::record_request("tokenize");
    Json(TokensResp {
        tokens: state.engine.tokenize(&body.text),
    })
}

async fn sentiment(State(state): State<AppState>, Json(body): Json<TextReq>) -> Json<SentimentResult> {
    metrics::record_request("sentiment");
    Json(state.engine.sentiment(&body.text))
}

async fn distribution(
    State(state): State<AppState>,
    Json(body): Json<TextsReq>,
) -> Result<Json<SentimentDistribution>, ComputeFailed> {
    let n = body.texts.len();
    run_engine(&state, "sentiment_distribution", n, move |e| {
        e.sentiment_distribution(&body.texts)
    })
    .await
    .map(Json)
}

async fn clusters(
    State(state): State<AppState>,
    Json(body): Json<ClustersReq>,
) -> Result<Json<Vec<ClusterResult>>, ComputeFailed> {
    let n = body.texts.len();
    let selection = body.k.map_or(KSelection::Auto, KSelection::Fixed);
    run_engine(&state, "clusters", n, move |e| e.cluster(&body.texts, selection))
        .await
        .map(Json)
}

async fn climate(
    State(state): State<AppState>,
    Json(body): Json<FormReq>,
) -> Result<Json<OverallClimate>, ComputeFailed> {
    let n = body.corpus_len();
    run_engine(&state, "climate", n, move |e| {
        e.overall_climate(&body.form, &body.responses)
    })
    .await
    .map(Json)
}

async fn summary(
    State(state): State<AppState>,
    Json(body): Json<FormReq>,
) -> Json<InsightsSummary> {
    metrics::record_request("summary");
    Json(state.engine.summarize(&body.form, &body.responses))
}

async fn insights(
    State(state): State<AppState>,
    Json(body): Json<FormReq>,
) -> Result<Json<FormInsights>, ComputeFailed> {
    let n = body.corpus_len();
    run_engine(&state, "insights", n, move |e| e.analyze(&body.form, &body.responses))
        .await
        .map(Json)
}
