//! Organiser API Server
//!
//! Run with: cargo run --bin organiser-api
//!
//! # Configuration
//!
//! Config file (see `organiser config`) plus environment variables:
//! - `ORGANISER_API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `ORGANISER_API_PORT`: Port to listen on (default: 8086)
//! - `ORGANISER_MAP_KEY`: Map service key handed to signed-in callers
//! - `ORGANISER_LOG_LEVEL` / `ORGANISER_LOG_FORMAT`: Logging (default: info, pretty)
//! - `RUST_LOG`: Overrides the log filter entirely

use organiser::api::{serve, AppState};
use organiser::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let discovery = Config::discover();
    discovery.config.logging.init();

    tracing::info!("Starting Organiser API server v{}", env!("CARGO_PKG_VERSION"));
    discovery.report();

    let api_config = discovery.config.api;
    let state = AppState::new(api_config.clone());
    tracing::info!("Map key configured: {}", state.map_key().is_some());

    serve(state, &api_config).await?;

    Ok(())
}
