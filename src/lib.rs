// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod analyze;
pub mod api;
pub mod config;
pub mod metrics;
pub mod oracle;
pub mod sentiment;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::analyze::{AnalysisRequest, AnalysisResult, Analyzer, DePaintResult, ScoringPolicy};
pub use crate::api::{router, AppState};
pub use crate::config::DamConfig;
pub use crate::oracle::TextOracle;

use axum::Router;
use tracing::info;

/// Build the full router from `config/dam.toml` (or `$DAM_CONFIG_PATH`) plus env overrides.
/// The oracle is loaded here, once, and shared by every handler.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = DamConfig::load()?;
    let state = AppState::from_config(&cfg)?;
    info!(
        policy = %cfg.scoring.policy,
        tagger_loaded = state.analyzer.oracle().tagger_loaded(),
        metrics = cfg.http.metrics,
        "router built"
    );
    Ok(router(state))
}
