mod chat;
mod config;
mod errors;
mod ingest;
mod llm_client;
mod models;
mod prompts;
mod routes;
mod session;
mod state;
mod tabs;

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::spawn_idle_sweeper;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting tabchat v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::from_config(&config)?;
    let configured = config.configured_providers();
    if configured.is_empty() {
        warn!("No provider API keys configured; every turn will fail until one is set");
    } else {
        info!("LLM providers with keys: {}", configured.join(", "));
    }

    let state = AppState::new(config.clone(), llm)?;
    info!("Stream mode: {:?}", state.stream_mode);

    spawn_idle_sweeper(
        state.sessions.clone(),
        Duration::from_secs(config.session_ttl_secs),
        Duration::from_secs(config.session_sweep_secs),
    );
    info!("Idle sessions expire after {}s", config.session_ttl_secs);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
