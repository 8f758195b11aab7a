use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::chat::StreamMode;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::session::SessionStore;

const FETCH_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub sessions: SessionStore,
    /// Client for job posting fetches, separate from the provider client so
    /// it gets its own shorter timeout.
    pub http: Client,
    pub config: Config,
    pub stream_mode: StreamMode,
}

impl AppState {
    pub fn new(config: Config, llm: LlmClient) -> Result<Self> {
        let stream_mode = StreamMode::parse(&config.stream_mode, config.replay_delay_ms)
            .ok_or_else(|| anyhow!("Invalid STREAM_MODE '{}'", config.stream_mode))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .user_agent(FETCH_USER_AGENT)
            .build()
            .context("Failed to build fetch HTTP client")?;

        Ok(Self {
            llm,
            sessions: SessionStore::new(),
            http,
            config,
            stream_mode,
        })
    }
}
