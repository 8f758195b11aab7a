use serde::Serialize;

use super::SessionError;
use crate::llm_client::ModelChoice;

/// System prompt used when nothing else has been set.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a comedian that tell jokes.";

/// Active model, active system prompt and the context-changed flag.
///
/// Any change to the model or the system prompt raises the flag; the next
/// outgoing user message consumes it and restarts the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    model: ModelChoice,
    system_prompt: Option<String>,
    context_changed: bool,
}

impl Default for SessionState {
    /// A fresh session starts with a pending context change so that its
    /// first message is seeded with a system prompt.
    fn default() -> Self {
        Self {
            model: ModelChoice::default(),
            system_prompt: None,
            context_changed: true,
        }
    }
}

impl SessionState {
    pub fn model(&self) -> ModelChoice {
        self.model
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// The prompt the next seeded conversation will start with.
    pub fn active_system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }

    pub fn context_changed(&self) -> bool {
        self.context_changed
    }

    /// Selects a model by dropdown label or short id. Unknown names are
    /// rejected and leave the state untouched.
    pub fn set_model(&mut self, name: &str) -> Result<ModelChoice, SessionError> {
        let choice =
            ModelChoice::from_name(name).ok_or_else(|| SessionError::UnknownModel(name.to_string()))?;
        self.select_model(choice);
        Ok(choice)
    }

    pub fn select_model(&mut self, choice: ModelChoice) {
        self.model = choice;
        self.context_changed = true;
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.system_prompt = Some(prompt.into());
        self.context_changed = true;
    }

    /// Forces the next send to re-seed the conversation.
    pub fn invalidate_context(&mut self) {
        self.context_changed = true;
    }

    /// Returns the flag and clears it.
    pub(crate) fn take_context_change(&mut self) -> bool {
        std::mem::replace(&mut self.context_changed, false)
    }
}
