//! LLM client: the only place vendor chat APIs are called.
//!
//! No other module may call a vendor API directly. Handlers and the
//! streaming driver only ever see `Arc<dyn ChatProvider>`.
//!
//! Model ids are fixed per provider; the dropdown label is the only thing a
//! user can change.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::models::Message;

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod provider;
pub mod sse;

pub use provider::ModelChoice;

/// Sampling temperature sent with every chat request.
pub const TEMPERATURE: f32 = 0.7;
/// Upper bound on generated tokens for every chat request.
pub const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} API key is not configured")]
    MissingApiKey(&'static str),

    #[error("No provider registered for {0}")]
    Unavailable(String),
}

/// A chat-completion backend that streams text deltas.
///
/// Implementations push each non-empty delta into `sink` in arrival order and
/// return once the vendor signals the end of the response. If the receiving
/// side of `sink` is gone the call returns `Ok(())` early.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Human-readable vendor name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// The vendor model identifier sent on the wire.
    fn model_id(&self) -> &str;

    async fn stream_chat(
        &self,
        messages: &[Message],
        sink: mpsc::Sender<String>,
    ) -> Result<(), LlmError>;
}

/// Connection settings shared by the HTTP-backed providers.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl ProviderSettings {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }
}

/// Registry of providers keyed by the model dropdown choice.
#[derive(Clone)]
pub struct LlmClient {
    providers: Arc<HashMap<ModelChoice, Arc<dyn ChatProvider>>>,
}

impl LlmClient {
    /// Builds the three HTTP providers from configuration. All of them share
    /// one connection pool.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.llm_timeout_secs))
            .build()?;

        let mut providers: HashMap<ModelChoice, Arc<dyn ChatProvider>> = HashMap::new();
        providers.insert(
            ModelChoice::OpenAi,
            Arc::new(openai::OpenAiProvider::new(
                http.clone(),
                ProviderSettings::new(&config.openai_base_url, config.openai_api_key.clone()),
            )),
        );
        providers.insert(
            ModelChoice::Claude,
            Arc::new(anthropic::AnthropicProvider::new(
                http.clone(),
                ProviderSettings::new(
                    &config.anthropic_base_url,
                    config.anthropic_api_key.clone(),
                ),
            )),
        );
        providers.insert(
            ModelChoice::Gemini,
            Arc::new(gemini::GeminiProvider::new(
                http,
                ProviderSettings::new(&config.gemini_base_url, config.google_api_key.clone()),
            )),
        );

        Ok(Self {
            providers: Arc::new(providers),
        })
    }

    /// Builds a registry from explicit providers. Used to plug in fakes.
    pub fn from_providers(
        providers: impl IntoIterator<Item = (ModelChoice, Arc<dyn ChatProvider>)>,
    ) -> Self {
        Self {
            providers: Arc::new(providers.into_iter().collect()),
        }
    }

    pub fn provider(&self, choice: ModelChoice) -> Result<Arc<dyn ChatProvider>, LlmError> {
        self.providers
            .get(&choice)
            .cloned()
            .ok_or_else(|| LlmError::Unavailable(choice.label().to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Turns a non-success response into `LlmError::Api`, pulling the vendor's
/// `error.message` out of the body when it has one.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(LlmError::Api {
        status: status.as_u16(),
        message: api_error_message(&body),
    })
}

/// Extracts `error.message` from an OpenAI/Anthropic/Gemini error body.
/// Gemini sometimes wraps the envelope in a one-element array.
pub(crate) fn api_error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body) {
        return envelope.error.message;
    }
    if let Ok(mut list) = serde_json::from_str::<Vec<ApiErrorEnvelope>>(body) {
        if !list.is_empty() {
            return list.swap_remove(0).error.message;
        }
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message_reads_envelope() {
        let body = r#"{"type":"error","error":{"type":"invalid_request_error","message":"bad model"}}"#;
        assert_eq!(api_error_message(body), "bad model");
    }

    #[test]
    fn test_api_error_message_reads_wrapped_envelope() {
        let body = r#"[{"error":{"code":400,"message":"API key not valid","status":"INVALID_ARGUMENT"}}]"#;
        assert_eq!(api_error_message(body), "API key not valid");
    }

    #[test]
    fn test_api_error_message_falls_back_to_body() {
        assert_eq!(api_error_message("upstream timeout"), "upstream timeout");
    }

    #[test]
    fn test_provider_settings_trim_trailing_slash_and_blank_key() {
        let settings = ProviderSettings::new("https://api.openai.com/v1/", Some("  ".to_string()));
        assert_eq!(settings.base_url, "https://api.openai.com/v1");
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn test_from_config_registers_every_model_choice() {
        let client = LlmClient::from_config(&Config::default()).unwrap();
        for choice in ModelChoice::all() {
            assert!(client.provider(choice).is_ok(), "{choice:?} missing");
        }
        assert_eq!(
            client.provider(ModelChoice::Claude).unwrap().model_id(),
            anthropic::MODEL
        );
    }

    #[test]
    fn test_unregistered_choice_is_unavailable() {
        let client = LlmClient::from_providers(Vec::new());
        let err = client.provider(ModelChoice::Gemini).err().unwrap();
        assert!(matches!(err, LlmError::Unavailable(label) if label == "Gemini AI"));
    }
}
