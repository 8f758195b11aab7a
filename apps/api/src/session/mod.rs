//! Per-session chat context: model selection, system prompt, the
//! context-changed flag, the conversation and the tab phases.
//!
//! Every browser session owns one `Session` behind its own mutex, so no
//! state is shared between sessions.

pub mod conversation;
pub mod handlers;
pub mod state;
pub mod store;

use thiserror::Error;
use uuid::Uuid;

pub use conversation::{seed_user_message, Conversation, SeededTurn};
pub use state::{SessionState, DEFAULT_SYSTEM_PROMPT};
pub use store::{spawn_idle_sweeper, Session, SessionSnapshot, SessionStore, SharedSession};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error("A response is already streaming for this session")]
    TurnInFlight,
}
