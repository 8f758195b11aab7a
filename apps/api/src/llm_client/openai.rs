//! OpenAI Chat Completions, streamed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use super::sse::{forward_sse, SseStep};
use super::{ensure_success, ChatProvider, LlmError, ProviderSettings, MAX_TOKENS, TEMPERATURE};
use crate::models::Message;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChunkEnvelope {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Option<ChunkDelta>,
}

#[derive(Debug, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    message: String,
}

/// Parses one `data:` payload of a chat-completions stream.
pub fn parse_openai_sse_data(data: &str) -> Result<SseStep, LlmError> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Ok(SseStep::Skip);
    }
    if trimmed == "[DONE]" {
        return Ok(SseStep::Done);
    }

    let chunk: ChunkEnvelope = serde_json::from_str(trimmed)?;
    if let Some(error) = chunk.error {
        return Err(LlmError::Stream(error.message));
    }

    let piece = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta)
        .and_then(|d| d.content);

    Ok(piece.map(SseStep::Piece).unwrap_or(SseStep::Skip))
}

pub struct OpenAiProvider {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiProvider {
    pub fn new(client: Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "OpenAI"
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

        let body = ChatCompletionRequest {
            model: MODEL,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: true,
        };

        debug!("OpenAI stream request: {} messages", messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.settings.base_url))
            .bearer_auth(api_key)
            .header("accept", "text/event-stream")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        forward_sse(response, &sink, parse_openai_sse_data).await
    }
}
