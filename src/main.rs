//! Response Climate Service: binary entrypoint.
//! Boots the Axum HTTP server over the insights engine.

use anyhow::Context;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use response_climate::{app, EngineConfig, InsightsEngine};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("response_climate=info,warn"));

    // Shuttle may already own the global subscriber; keep going without ours.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = EngineConfig::load_default().context("loading engine config")?;
    let engine = InsightsEngine::from_config(config).context("building insights engine")?;
    let router = app(engine)?;

    Ok(router.into())
}
