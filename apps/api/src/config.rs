use anyhow::{bail, Context, Result};

use crate::llm_client::{anthropic, gemini, openai};

/// Application configuration loaded from environment variables.
/// Provider keys are optional: a provider without a key fails per request,
/// not at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub google_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_base_url: String,
    pub gemini_base_url: String,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    /// `incremental` or `replay`.
    pub stream_mode: String,
    pub replay_delay_ms: u64,
    pub llm_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub max_upload_bytes: usize,
    /// Sessions unused for this long are dropped.
    pub session_ttl_secs: u64,
    pub session_sweep_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openai_api_key: None,
            anthropic_api_key: None,
            google_api_key: None,
            openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
            anthropic_base_url: anthropic::DEFAULT_BASE_URL.to_string(),
            gemini_base_url: gemini::DEFAULT_BASE_URL.to_string(),
            host: "0.0.0.0".to_string(),
            port: 7860,
            rust_log: "info".to_string(),
            stream_mode: "incremental".to_string(),
            replay_delay_ms: 0,
            llm_timeout_secs: 120,
            fetch_timeout_secs: 15,
            max_upload_bytes: 10 * 1024 * 1024,
            session_ttl_secs: 60 * 60,
            session_sweep_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        let config = Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            google_api_key: optional_env("GOOGLE_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            anthropic_base_url: optional_env("ANTHROPIC_BASE_URL")
                .unwrap_or(defaults.anthropic_base_url),
            gemini_base_url: optional_env("GEMINI_BASE_URL").unwrap_or(defaults.gemini_base_url),
            host: optional_env("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT", defaults.port)?,
            rust_log: optional_env("RUST_LOG").unwrap_or(defaults.rust_log),
            stream_mode: optional_env("STREAM_MODE")
                .map(|m| m.to_lowercase())
                .unwrap_or(defaults.stream_mode),
            replay_delay_ms: parse_env("REPLAY_DELAY_MS", defaults.replay_delay_ms)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", defaults.llm_timeout_secs)?,
            fetch_timeout_secs: parse_env("FETCH_TIMEOUT_SECS", defaults.fetch_timeout_secs)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            session_ttl_secs: parse_env("SESSION_TTL_SECS", defaults.session_ttl_secs)?,
            session_sweep_secs: parse_env("SESSION_SWEEP_SECS", defaults.session_sweep_secs)?,
        };

        if !matches!(config.stream_mode.as_str(), "incremental" | "replay") {
            bail!(
                "STREAM_MODE must be 'incremental' or 'replay', got '{}'",
                config.stream_mode
            );
        }

        if config.session_ttl_secs == 0 || config.session_sweep_secs == 0 {
            bail!("SESSION_TTL_SECS and SESSION_SWEEP_SECS must be greater than zero");
        }

        Ok(config)
    }

    /// Names of the providers that have an API key configured.
    pub fn configured_providers(&self) -> Vec<&'static str> {
        [
            ("openai", &self.openai_api_key),
            ("anthropic", &self.anthropic_api_key),
            ("gemini", &self.google_api_key),
        ]
        .into_iter()
        .filter(|(_, key)| key.is_some())
        .map(|(name, _)| name)
        .collect()
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_no_keys_and_incremental_streaming() {
        let config = Config::default();
        assert!(config.configured_providers().is_empty());
        assert_eq!(config.stream_mode, "incremental");
        assert_eq!(config.port, 7860);
        assert_eq!(config.session_ttl_secs, 3600);
    }

    #[test]
    fn test_configured_providers_lists_keyed_vendors() {
        let config = Config {
            anthropic_api_key: Some("sk-ant".to_string()),
            ..Config::default()
        };
        assert_eq!(config.configured_providers(), vec!["anthropic"]);
    }

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("TABCHAT_TEST_UNSET_PORT", 9000).unwrap();
        assert_eq!(value, 9000);
    }
}
