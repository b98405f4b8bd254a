// tests/degraded_mode.rs
//
// Behaviour when the tagger model is not provisioned: sentiment keeps working,
// /health reports 503, de-painting passes text through, policy B cannot score.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use dam_firewall::analyze::Analyzer;
use dam_firewall::api::{self, AppState, DEGRADED_HEADER};
use dam_firewall::config::ServiceSection;
use dam_firewall::{ScoringPolicy, TextOracle};

fn degraded_router(policy: ScoringPolicy) -> Router {
    let oracle = Arc::new(TextOracle::sentiment_only());
    let state = AppState::new(Analyzer::new(oracle, policy, 10_000), ServiceSection::default());
    api::router(state)
}

async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_is_503_with_remediation() {
    let app = degraded_router(ScoringPolicy::SpikeDivergence);
    let resp = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let v = read_json(resp).await;
    assert_eq!(v["error"], "oracle_unavailable");
    assert!(v["detail"].as_str().unwrap().contains("DAM_TAGGER_MODEL"));
}

#[tokio::test]
async fn root_still_answers() {
    let app = degraded_router(ScoringPolicy::SpikeDivergence);
    let resp = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["nlp_model_loaded"], false);
}

#[tokio::test]
async fn depaint_passes_text_through() {
    let app = degraded_router(ScoringPolicy::SpikeDivergence);
    let text = "The quick brown fox jumps.";
    let resp = app
        .oneshot(post("/api/depaint", json!({ "text": text })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()
            .get(DEGRADED_HEADER)
            .and_then(|h| h.to_str().ok()),
        Some("1")
    );
    let v = read_json(resp).await;
    assert_eq!(v["original_text"], text);
    assert_eq!(v["de_painted_text"], text);
    assert_eq!(v["removed_adjectives"], json!([]));
}

#[tokio::test]
async fn policy_b_analyze_is_503() {
    let app = degraded_router(ScoringPolicy::SpikeDivergence);
    let resp = app
        .oneshot(post("/api/analyze", json!({ "text": "Stocks slump." })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let v = read_json(resp).await;
    assert!(v["detail"]
        .as_str()
        .unwrap()
        .starts_with("NLP tagger model not loaded"));
}

#[tokio::test]
async fn validation_still_comes_first() {
    let app = degraded_router(ScoringPolicy::SpikeDivergence);
    let resp = app
        .oneshot(post("/api/analyze", json!({ "text": "  " })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn policy_a_analyze_works_on_sentiment_alone() {
    let app = degraded_router(ScoringPolicy::Subjectivity);
    let resp = app
        .oneshot(post(
            "/analyze",
            json!({ "text": "This is absolutely amazing and wonderful!" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert!(v["distraction_score"].as_f64().unwrap() >= 0.7);
    assert_eq!(
        v["analysis"],
        "High distraction content detected. Consider skipping."
    );
    assert!(v.get("de_painted_text").is_none());
}
