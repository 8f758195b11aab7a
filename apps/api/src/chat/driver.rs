//! Streaming response driver: runs one conversation turn against a provider.
//!
//! The driver appends exactly one assistant message to the history and grows
//! it one unit at a time, emitting a `TurnEvent::Delta` per increment. The
//! turn ends with `Done` (full text) or `Failed` (the assistant message is
//! replaced by a warning). There is no retry and no partial-result salvage.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::llm_client::{ChatProvider, LlmError};
use crate::session::Conversation;

/// Prefix of the synthetic assistant message that reports a failed turn.
pub const ERROR_GLYPH: &str = "⚠️";

/// Provider chunks buffered between the provider task and the driver.
const CHUNK_BUFFER: usize = 64;

/// How provider output reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamMode {
    /// Forward each provider chunk as it arrives.
    #[default]
    Incremental,
    /// Buffer the whole response, then re-emit it one character at a time.
    Replay { delay: Duration },
}

impl StreamMode {
    /// Parses the `STREAM_MODE` setting.
    pub fn parse(mode: &str, replay_delay_ms: u64) -> Option<Self> {
        match mode.trim().to_ascii_lowercase().as_str() {
            "incremental" => Some(StreamMode::Incremental),
            "replay" => Some(StreamMode::Replay {
                delay: Duration::from_millis(replay_delay_ms),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// The assistant message grew by `delta`; `content` is its text so far.
    Delta { delta: String, content: String },
    /// The turn finished; the last message holds the full response.
    Done { conversation: Conversation },
    /// The provider failed; the last message is the warning shown in chat.
    Failed {
        message: String,
        conversation: Conversation,
    },
}

impl TurnEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TurnEvent::Delta { .. } => "delta",
            TurnEvent::Done { .. } => "done",
            TurnEvent::Failed { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnStatus {
    Completed,
    Failed,
    /// The event receiver went away before the turn finished.
    Abandoned,
}

/// Where a turn ended and the history it left behind.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub status: TurnStatus,
    pub conversation: Conversation,
}

pub struct ResponseDriver {
    provider: Arc<dyn ChatProvider>,
    mode: StreamMode,
}

impl ResponseDriver {
    pub fn new(provider: Arc<dyn ChatProvider>, mode: StreamMode) -> Self {
        Self { provider, mode }
    }

    /// Runs one turn over `history` (which should end in a user message),
    /// sending events to `events` as the response grows.
    pub async fn run(
        &self,
        mut history: Conversation,
        events: &mpsc::Sender<TurnEvent>,
    ) -> TurnOutcome {
        info!(
            "Turn started: provider={} model={} messages={}",
            self.provider.name(),
            self.provider.model_id(),
            history.len()
        );

        let (tx, mut rx) = mpsc::channel::<String>(CHUNK_BUFFER);
        let provider = Arc::clone(&self.provider);
        let request = history.messages().to_vec();
        let call = tokio::spawn(async move { provider.stream_chat(&request, tx).await });

        history.begin_assistant();

        match self.mode {
            StreamMode::Incremental => {
                while let Some(chunk) = rx.recv().await {
                    if !emit_piece(&mut history, &chunk, events).await {
                        call.abort();
                        return abandoned(history);
                    }
                }
                if let Err(err) = join_call(call).await {
                    return fail(history, err, events).await;
                }
            }
            StreamMode::Replay { delay } => {
                let mut full = String::new();
                while let Some(chunk) = rx.recv().await {
                    full.push_str(&chunk);
                }
                if let Err(err) = join_call(call).await {
                    return fail(history, err, events).await;
                }

                debug!("Replaying {} buffered characters", full.chars().count());
                let mut unit = [0u8; 4];
                for ch in full.chars() {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    if !emit_piece(&mut history, ch.encode_utf8(&mut unit), events).await {
                        return abandoned(history);
                    }
                }
            }
        }

        info!(
            "Turn completed: {} chars",
            history.last().map(|m| m.content.len()).unwrap_or(0)
        );
        // A dropped receiver here is fine: the outcome still carries the history.
        let _ = events
            .send(TurnEvent::Done {
                conversation: history.clone(),
            })
            .await;

        TurnOutcome {
            status: TurnStatus::Completed,
            conversation: history,
        }
    }
}

/// Returns `false` when the event receiver is gone.
async fn emit_piece(
    history: &mut Conversation,
    piece: &str,
    events: &mpsc::Sender<TurnEvent>,
) -> bool {
    let content = match history.extend_assistant(piece) {
        Some(content) => content.to_string(),
        None => return true,
    };

    events
        .send(TurnEvent::Delta {
            delta: piece.to_string(),
            content,
        })
        .await
        .is_ok()
}

async fn join_call(call: tokio::task::JoinHandle<Result<(), LlmError>>) -> Result<(), String> {
    match call.await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("provider task failed: {e}")),
    }
}

async fn fail(
    mut history: Conversation,
    message: String,
    events: &mpsc::Sender<TurnEvent>,
) -> TurnOutcome {
    error!("Turn failed: {message}");
    history.replace_assistant(format!("{ERROR_GLYPH} {message}"));

    let _ = events
        .send(TurnEvent::Failed {
            message,
            conversation: history.clone(),
        })
        .await;

    TurnOutcome {
        status: TurnStatus::Failed,
        conversation: history,
    }
}

fn abandoned(history: Conversation) -> TurnOutcome {
    info!("Turn abandoned: client disconnected");
    TurnOutcome {
        status: TurnStatus::Abandoned,
        conversation: history,
    }
}
