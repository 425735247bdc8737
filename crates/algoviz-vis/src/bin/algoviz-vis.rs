//! Algoviz Visualization Server
//!
//! Serve the playback API on `ALGOVIZ_ADDR` (default `0.0.0.0:3000`).

use std::net::SocketAddr;

use algoviz_engine::EngineConfig;
use algoviz_vis::VisServer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoviz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = std::env::var("ALGOVIZ_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let config = EngineConfig::from_env();
    tracing::info!(
        delay_scale = config.delay_scale,
        event_capacity = config.event_capacity,
        max_len = config.max_len,
        "Starting algoviz"
    );

    VisServer::new(config).serve(addr).await?;
    Ok(())
}
