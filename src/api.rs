// src/api.rs
//! HTTP surface: stateless handlers over the shared `Analyzer`.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

use crate::analyze::{AnalysisRequest, AnalysisResult, AnalyzeError, Analyzer};
use crate::config::{DamConfig, ServiceSection};
use crate::metrics::{self, Metrics};
use crate::oracle::TextOracle;
use crate::telemetry::anon_hash;

pub const DEGRADED_HEADER: &str = "x-oracle-degraded";

#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub service: Arc<ServiceSection>,
    metrics: Option<Arc<Metrics>>,
    /// Operator hint appended to "tagger not loaded" errors.
    remediation: Arc<str>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, service: ServiceSection) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            service: Arc::new(service),
            metrics: None,
            remediation: Arc::from(
                "Provide a tagger model (see [oracle].tagger_model or DAM_TAGGER_MODEL).",
            ),
        }
    }

    /// Build everything from config: oracle (tagger loaded once), analyzer, metrics.
    pub fn from_config(cfg: &DamConfig) -> anyhow::Result<Self> {
        let oracle = Arc::new(TextOracle::load(&cfg.oracle.tagger_model));
        let tagger_loaded = oracle.tagger_loaded();
        let analyzer = Analyzer::new(oracle, cfg.scoring.policy, cfg.limits.max_text_chars);

        let mut state = Self::new(analyzer, cfg.service.clone());
        state.remediation = Arc::from(format!(
            "Place the tagger model at {} or set DAM_TAGGER_MODEL to its path.",
            cfg.oracle.tagger_model.display()
        ));
        if cfg.http.metrics {
            state.metrics = Some(Arc::new(Metrics::init(tagger_loaded)?));
        }
        Ok(state)
    }

    fn oracle(&self) -> &TextOracle {
        self.analyzer.oracle()
    }
}

pub fn router(state: AppState) -> Router {
    let mut r = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/api/analyze", post(analyze))
        .route("/api/depaint", post(depaint));
    if state.metrics.is_some() {
        r = r.route("/metrics", get(metrics_text));
    }
    // Development posture: any origin, method, header.
    r.layer(CorsLayer::very_permissive()).with_state(state)
}

/* ----------------------------
Errors
---------------------------- */

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    detail: String,
}

impl ApiError {
    fn from_analyze(e: AnalyzeError, remediation: &str) -> Self {
        match e {
            AnalyzeError::EmptyText | AnalyzeError::TextTooLong { .. } => Self {
                status: StatusCode::BAD_REQUEST,
                kind: "validation_error",
                detail: e.to_string(),
            },
            AnalyzeError::OracleUnavailable => Self::oracle_unavailable(remediation),
            AnalyzeError::Internal(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                kind: "internal_error",
                detail: e.to_string(),
            },
        }
    }

    fn oracle_unavailable(remediation: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            kind: "oracle_unavailable",
            detail: format!("NLP tagger model not loaded. {remediation}"),
        }
    }

    fn from_rejection(r: JsonRejection) -> Self {
        Self {
            status: r.status(),
            kind: "invalid_request",
            detail: r.body_text(),
        }
    }

    fn outcome(&self) -> &'static str {
        self.kind
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.kind, "detail": self.detail })),
        )
            .into_response()
    }
}

/* ----------------------------
Handlers
---------------------------- */

async fn root(State(state): State<AppState>) -> Json<serde_json::Value> {
    let oracle = state.oracle();
    Json(json!({
        "name": state.service.name,
        "version": state.service.version,
        "status": "operational",
        "nlp_model_loaded": oracle.tagger_loaded(),
        "policy": state.analyzer.policy(),
        "sentiment_lexicon_size": oracle.lexicon_size(),
    }))
}

async fn health(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    match state.oracle().model_name() {
        Some(model) => Ok(Json(json!({
            "status": "healthy",
            "nlp_model": model,
            "policy": state.analyzer.policy(),
        }))),
        None => Err(ApiError::oracle_unavailable(&state.remediation)),
    }
}

async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    const EP: &str = "analyze";
    let started = Instant::now();

    let Json(req) = payload.map_err(|r| fail(EP, ApiError::from_rejection(r)))?;
    let id = anon_hash(&req.text);

    let result = state
        .analyzer
        .analyze(&req)
        .map_err(|e| fail(EP, ApiError::from_analyze(e, &state.remediation)))?;

    let ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics::record_request(EP, "ok");
    metrics::record_latency(EP, ms);
    debug!(
        %id,
        score = result.distraction_score,
        policy = %result.policy,
        elapsed_ms = ms,
        "analyzed"
    );
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
struct DePaintRequest {
    text: String,
}

async fn depaint(
    State(state): State<AppState>,
    payload: Result<Json<DePaintRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    const EP: &str = "depaint";
    let started = Instant::now();

    let Json(req) = payload.map_err(|r| fail(EP, ApiError::from_rejection(r)))?;
    let result = state
        .analyzer
        .depaint(&req.text)
        .map_err(|e| fail(EP, ApiError::from_analyze(e, &state.remediation)))?;

    let ms = started.elapsed().as_secs_f64() * 1000.0;
    metrics::record_request(EP, "ok");
    metrics::record_latency(EP, ms);
    debug!(
        id = %anon_hash(&req.text),
        removed = result.removed_adjectives.len(),
        degraded = result.degraded,
        "de-painted"
    );

    let degraded = result.degraded;
    let mut resp = Json(result).into_response();
    if degraded {
        metrics::record_degraded(EP);
        resp.headers_mut()
            .insert(DEGRADED_HEADER, HeaderValue::from_static("1"));
    }
    Ok(resp)
}

async fn metrics_text(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|m| m.render())
        .unwrap_or_default()
}

/// Count and log a failed request, passing the error through.
fn fail(endpoint: &'static str, err: ApiError) -> ApiError {
    metrics::record_request(endpoint, err.outcome());
    if err.status.is_server_error() {
        warn!(endpoint, status = err.status.as_u16(), detail = %err.detail, "request failed");
    } else {
        debug!(endpoint, status = err.status.as_u16(), "request rejected");
    }
    err
}
