//! Anthropic Messages API, streamed.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use super::sse::{forward_sse, SseStep};
use super::{ensure_success, ChatProvider, LlmError, ProviderSettings, MAX_TOKENS, TEMPERATURE};
use crate::models::{Message, Role};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-opus-4-1-20250805";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Anthropic takes the system prompt as a top-level field, not as a message.
/// Multiple system messages are joined with a blank line.
fn split_system<'a>(messages: &'a [Message]) -> (Option<String>, Vec<AnthropicMessage<'a>>) {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let turns = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| AnthropicMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect();

    let system = if system.is_empty() {
        None
    } else {
        Some(system.join("\n\n"))
    };
    (system, turns)
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(rename = "type")]
    event_type: String,
    delta: Option<EventDelta>,
    error: Option<EventError>,
}

#[derive(Debug, Deserialize)]
struct EventDelta {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventError {
    message: String,
}

/// Parses one `data:` payload of a Messages stream.
pub fn parse_anthropic_sse_data(data: &str) -> Result<SseStep, LlmError> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Ok(SseStep::Skip);
    }

    let event: StreamEvent = serde_json::from_str(trimmed)?;
    match event.event_type.as_str() {
        "content_block_delta" => Ok(event
            .delta
            .and_then(|d| d.text)
            .map(SseStep::Piece)
            .unwrap_or(SseStep::Skip)),
        "message_stop" => Ok(SseStep::Done),
        "error" => Err(LlmError::Stream(
            event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown stream error".to_string()),
        )),
        _ => Ok(SseStep::Skip),
    }
}

pub struct AnthropicProvider {
    client: Client,
    settings: ProviderSettings,
}

impl AnthropicProvider {
    pub fn new(client: Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "Anthropic"
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

        let (system, turns) = split_system(messages);
        let body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            system,
            messages: turns,
            stream: true,
        };

        debug!("Anthropic stream request: {} turns", body.messages.len());

        let response = self
            .client
            .post(format!("{}/messages", self.settings.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        forward_sse(response, &sink, parse_anthropic_sse_data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_system_moves_system_prompt_out_of_messages() {
        let messages = vec![
            Message::system("You are a chef."),
            Message::user("Pasta?"),
            Message::assistant("Sure."),
            Message::user("More."),
        ];
        let (system, turns) = split_system(&messages);
        assert_eq!(system.as_deref(), Some("You are a chef."));
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, "user");
        assert_eq!(turns[1].role, "assistant");
    }

    #[test]
    fn test_split_system_without_system_message() {
        let messages = vec![Message::user("hi")];
        let (system, turns) = split_system(&messages);
        assert!(system.is_none());
        assert_eq!(turns.len(), 1);
    }

    #[test]
    fn test_parses_text_delta() {
        let data = r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Why did"}}"#;
        assert_eq!(
            parse_anthropic_sse_data(data).unwrap(),
            SseStep::Piece("Why did".to_string())
        );
    }

    #[test]
    fn test_bookkeeping_events_are_skipped() {
        for data in [
            r#"{"type":"message_start","message":{"id":"m1"}}"#,
            r#"{"type":"content_block_start","index":0,"content_block":{"type":"text","text":""}}"#,
            r#"{"type":"ping"}"#,
            r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"}}"#,
        ] {
            assert_eq!(parse_anthropic_sse_data(data).unwrap(), SseStep::Skip, "{data}");
        }
    }

    #[test]
    fn test_message_stop_ends_stream() {
        assert_eq!(
            parse_anthropic_sse_data(r#"{"type":"message_stop"}"#).unwrap(),
            SseStep::Done
        );
    }

    #[test]
    fn test_error_event_is_reported() {
        let data = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err = parse_anthropic_sse_data(data).unwrap_err();
        assert!(matches!(err, LlmError::Stream(msg) if msg == "Overloaded"));
    }
}
