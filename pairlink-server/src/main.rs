use anyhow::Result;
use clap::Parser;
use pairlink_server::{RelayConfig, RelayServer};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = RelayConfig::parse();
    info!("Starting relay with {:?}", config);

    let server = RelayServer::bind(&config).await?;
    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
}
