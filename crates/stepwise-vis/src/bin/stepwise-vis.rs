//! Stepwise Playback Server
//!
//! Serve the playback API with settings taken from the environment.

use stepwise_vis::{VisConfig, VisServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stepwise=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = VisConfig::from_env()?;
    tracing::info!(
        port = config.port,
        base_interval_ms = config.playback.base_interval.as_millis() as u64,
        "Starting playback server"
    );

    let server = VisServer::new(&config);
    server.serve(config.port).await?;

    Ok(())
}
