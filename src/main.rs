mod config;
mod error;
mod euler;
mod server;
mod stats;
mod svg;

use anyhow::{Context, Result};
use config::Config;
use euler::EulerClient;
use server::AppState;
use svg::BadgeRenderer;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load the .env file, if any
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let state = AppState {
        client: EulerClient::new(&config.base_url, config.upstream_timeout)?,
        renderer: BadgeRenderer::new(config.title.clone(), config.theme),
    };

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, upstream = %config.base_url, "badge server listening");

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", err);
            }
        })
        .await
        .context("Server error")?;

    Ok(())
}
