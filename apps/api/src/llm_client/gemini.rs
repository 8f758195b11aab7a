//! Google Gemini `streamGenerateContent`, requested as SSE.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use super::sse::{forward_sse, SseStep};
use super::{ensure_success, ChatProvider, LlmError, ProviderSettings, MAX_TOKENS, TEMPERATURE};
use crate::models::{Message, Role};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const MODEL: &str = "gemini-1.5-pro";
const TOP_P: f32 = 0.95;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
}

fn text_content(role: Option<&str>, text: &str) -> Content {
    Content {
        role: role.map(str::to_string),
        parts: vec![Part {
            text: Some(text.to_string()),
        }],
    }
}

/// Gemini calls the assistant `model` and takes the system prompt as
/// `systemInstruction`.
fn build_request(messages: &[Message]) -> GenerateRequest {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let contents = messages
        .iter()
        .filter_map(|m| match m.role {
            Role::System => None,
            Role::User => Some(text_content(Some("user"), &m.content)),
            Role::Assistant => Some(text_content(Some("model"), &m.content)),
        })
        .collect();

    GenerateRequest {
        contents,
        system_instruction: (!system.is_empty())
            .then(|| text_content(None, &system.join("\n\n"))),
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_TOKENS,
            top_p: TOP_P,
        },
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    message: String,
}

/// Parses one `data:` payload of a `streamGenerateContent?alt=sse` response.
/// Gemini has no end marker; the stream simply closes.
pub fn parse_gemini_sse_data(data: &str) -> Result<SseStep, LlmError> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Ok(SseStep::Skip);
    }

    let chunk: StreamChunk = serde_json::from_str(trimmed)?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Stream(error.message));
    }

    let text: String = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        Ok(SseStep::Skip)
    } else {
        Ok(SseStep::Piece(text))
    }
}

pub struct GeminiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl GeminiProvider {
    pub fn new(client: Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn model_id(&self) -> &str {
        MODEL
    }

    async fn stream_chat(
        &self,
        messages: &[Message],
        sink: mpsc::Sender<String>,
    ) -> Result<(), LlmError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingApiKey(self.name()))?;

        let body = build_request(messages);
        debug!("Gemini stream request: {} contents", body.contents.len());

        let response = self
            .client
            .post(format!(
                "{}/models/{}:streamGenerateContent",
                self.settings.base_url, MODEL
            ))
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        forward_sse(response, &sink, parse_gemini_sse_data).await
    }
}
