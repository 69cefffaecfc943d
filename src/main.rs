//! Card Oracle: binary entrypoint
//! Boots the Axum HTTP server (Shuttle runtime) with the advisor loaded from config.

use shuttle_axum::ShuttleAxum;
use tracing::info;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    // Picks up ADVISOR_CONFIG_PATH / ADVISOR_API_KEY / RUST_LOG.
    let _ = dotenvy::dotenv();

    card_oracle::telemetry::init_tracing();

    let router = card_oracle::app();
    info!("card-oracle router built");

    Ok(router.into())
}
