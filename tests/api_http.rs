// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use tower::ServiceExt as _; // for `oneshot`

use response_climate::{api, AppState, EngineConfig, InsightsEngine, Lexicon};

const BODY_LIMIT: usize = 1024 * 1024;

fn test_router() -> Router {
    api::router(AppState::default())
}

async fn post_json(app: Router, uri: &str, payload: Json) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v = serde_json::from_slice(&bytes).unwrap_or(Json::Null);
    (status, v)
}

fn feedback_payload() -> Json {
    json!({
        "form": {
            "title": "Feedback",
            "questions": [
                { "id": "q1", "title": "Thoughts?", "type": "textarea" },
                { "id": "q2", "title": "Plan", "type": "dropdown", "options": ["free", "pro"] }
            ]
        },
        "responses": [
            { "answers": [ { "questionId": "q1", "value": "great" },  { "questionId": "q2", "value": "pro" } ] },
            { "answers": [ { "questionId": "q1", "value": "good" },   { "questionId": "q2", "value": "pro" } ] },
            { "answers": [ { "questionId": "q1", "value": "love it" } ] },
            { "answers": [ { "questionId": "q1", "value": "excellent" } ] },
            { "answers": [ { "questionId": "q1", "value": "bad" },    { "questionId": "q2", "value": "free" } ] },
            { "answers": [ { "questionId": "q1", "value": "terrible" } ] }
        ]
    })
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8"), "ok");
}

#[tokio::test]
async fn tokenize_drops_stopwords_and_short_tokens() {
    let (status, v) = post_json(test_router(), "/tokenize", json!({ "text": "The UI is a bit slow!" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["tokens"], json!(["ui", "bit", "slow"]));
}

#[tokio::test]
async fn sentiment_returns_score_and_label() {
    let (status, v) = post_json(test_router(), "/sentiment", json!({ "text": "great product" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["score"], json!(1.0));
    assert_eq!(v["label"], "positive");
}

#[tokio::test]
async fn distribution_uses_camel_case_fields() {
    let (status, v) = post_json(
        test_router(),
        "/sentiment/distribution",
        json!({ "texts": ["great", "bad", "okay then"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["distribution"], json!({ "positive": 1, "neutral": 1, "negative": 1 }));
    assert_eq!(v["topPositive"], json!(["great"]));
    assert_eq!(v["topNegative"], json!(["bad"]));
}

#[tokio::test]
async fn clusters_fixed_and_auto() {
    let texts = json!(["price cost", "design layout", "price value", "layout fonts"]);
    let (status, v) = post_json(test_router(), "/clusters", json!({ "texts": texts, "k": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    let clusters = v.as_array().expect("array");
    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0]["indices"], json!([0, 2]));
    assert_eq!(clusters[1]["indices"], json!([1, 3]));

    let (status, v) = post_json(test_router(), "/clusters", json!({ "texts": [] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, json!([]));
}

#[tokio::test]
async fn climate_and_summary_for_a_form() {
    let (status, v) = post_json(test_router(), "/climate", feedback_payload()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["positivityScore"], 67);
    assert_eq!(v["dominantTendency"], "positive");
    assert_eq!(
        v["sentimentBreakdown"],
        json!({ "positive": 4, "neutral": 0, "negative": 2 })
    );
    assert!(v.get("semanticAxis").is_some(), "six texts carry an axis");

    let (status, v) = post_json(test_router(), "/summary", feedback_payload()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["responseCount"], 6);
    assert_eq!(v["completionAvgPct"], 75);
    assert_eq!(v["topOptions"][0], json!({ "option": "pro", "questionTitle": "Plan", "count": 2 }));
}

#[tokio::test]
async fn insights_bundle_matches_single_endpoints() {
    let (_, climate) = post_json(test_router(), "/climate", feedback_payload()).await;
    let (status, v) = post_json(test_router(), "/insights", feedback_payload()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["climate"], climate);
    assert_eq!(v["textCount"], 6);
    assert_eq!(v["corpusId"].as_str().map(str::len), Some(12));
    assert_eq!(v["dataQuality"]["textQuality"], "low");
    assert!(v.get("trend").is_none());
}

#[tokio::test]
async fn large_corpus_is_offloaded_with_same_result() {
    let cfg = EngineConfig {
        offload_threshold: 1,
        ..EngineConfig::default()
    };
    let offloaded = api::router(AppState::new(InsightsEngine::new(Lexicon::builtin().clone(), cfg)));
    let (status, a) = post_json(offloaded, "/climate", feedback_payload()).await;
    assert_eq!(status, StatusCode::OK);
    let (_, b) = post_json(test_router(), "/climate", feedback_payload()).await;
    assert_eq!(a, b);
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri("/climate")
        .header("content-type", "application/json")
        .body(Body::from("{\"form\": 3}"))
        .expect("build POST");
    let resp = test_router().oneshot(req).await.expect("oneshot");
    assert!(resp.status().is_client_error(), "got {}", resp.status());
}

#[tokio::test]
async fn clusters_with_huge_k_degrade_to_corpus_size() {
    let (status, v) = post_json(
        test_router(),
        "/clusters",
        json!({ "texts": ["alpha beta", "gamma"], "k": u64::MAX }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn odd_answer_values_are_tolerated() {
    let payload = json!({
        "form": {
            "questions": [
                { "id": "q1", "title": "Thoughts?", "type": "text" },
                { "id": "q2", "title": "Tags", "type": "checkbox" }
            ]
        },
        "responses": [
            { "answers": [ { "questionId": "q1", "value": "great" }, { "questionId": "q2", "value": [1, 2] } ] },
            { "answers": [ { "questionId": "q1", "value": false },   { "questionId": "q2", "value": { "x": 1 } } ] },
            { "answers": [ { "questionId": "q1", "value": 0 } ] }
        ]
    });
    let (status, v) = post_json(test_router(), "/climate", payload.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["sentimentBreakdown"], json!({ "positive": 1, "neutral": 0, "negative": 0 }));
    assert_eq!(v["positivityScore"], 100);

    let (status, v) = post_json(test_router(), "/summary", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(v["topOptions"][0]["option"], "1");
}
