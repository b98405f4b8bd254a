//! DAM Cognitive Firewall: binary entrypoint
//! Boots the Axum HTTP server: config, oracle (loaded once), routes, CORS.

use shuttle_axum::ShuttleAxum;

use dam_firewall::telemetry::enable_dev_tracing;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // Picks up DAM_CONFIG_PATH / DAM_SCORING_POLICY / DAM_TAGGER_MODEL.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    enable_dev_tracing();

    let router = dam_firewall::app().await?;

    Ok(router.into())
}
