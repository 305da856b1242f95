//! Smart Traffic Engine - Main Entry Point

use std::sync::Arc;

use analytics::{EngineConfig, TrafficAnalytics};
use api::{init_logging, run_server, AppState};
use heartbeat::{NodeRegistry, SweeperConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Smart Traffic Engine v{} ===", env!("CARGO_PKG_VERSION"));

    // Optional config file; TRAFFIC_* environment variables override it
    let config_path = std::env::var("TRAFFIC_CONFIG").unwrap_or_else(|_| "traffic".to_string());
    let config = EngineConfig::load(Some(&config_path))?;

    let analytics = Arc::new(TrafficAnalytics::new(config)?);

    let sweeper = SweeperConfig::default();
    let nodes = Arc::new(NodeRegistry::new(sweeper.offline_after_secs));
    NodeRegistry::spawn_sweeper(Arc::clone(&nodes), sweeper);

    let state = Arc::new(AppState::new(analytics, nodes));

    let addr = "0.0.0.0:8080";
    run_server(addr, state).await?;

    Ok(())
}
