// src/main.rs

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use meatmarket_mcp::{
    api::create_router,
    blockchain::evm_client::EvmClient,
    config::Config,
    mcp::{session::Session, transport::serve_stdio},
    AppState,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) -> Result<()> {
    let app = create_router(state.clone());

    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    info!("HTTP server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}

async fn run() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    info!("Marketplace API: {}", config.api_url);

    let session = Session::load(&config);
    if !session.has_credentials() {
        info!("No API credentials yet; only register and wallet tools will work");
    }

    let backend = Arc::new(EvmClient::new(&config));
    let state = AppState::new(config, session, backend)?;

    let http = env::args().any(|a| a == "--http") || state.config.http_mode;
    if http {
        run_http_server(state).await
    } else {
        serve_stdio(state).await;
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    // stdout carries the protocol; all logs go to stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meatmarket_mcp=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
