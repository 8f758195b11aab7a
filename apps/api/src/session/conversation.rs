use serde::{Deserialize, Serialize};

use super::SessionState;
use crate::models::{Message, Role};

/// Ordered role-tagged history sent to a model. Messages are only ever
/// appended; the one in-place edit is growing the trailing assistant
/// message while a response streams in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Opens the assistant message a streaming turn writes into.
    pub fn begin_assistant(&mut self) {
        self.messages.push(Message::assistant(""));
    }

    /// Appends `piece` to the trailing assistant message and returns its
    /// content so far. Returns `None` when the last message is not an
    /// assistant message.
    pub fn extend_assistant(&mut self, piece: &str) -> Option<&str> {
        match self.messages.last_mut() {
            Some(m) if m.role == Role::Assistant => {
                m.content.push_str(piece);
                Some(m.content.as_str())
            }
            _ => None,
        }
    }

    /// Overwrites the trailing assistant message, opening one if needed.
    pub fn replace_assistant(&mut self, content: impl Into<String>) {
        match self.messages.last_mut() {
            Some(m) if m.role == Role::Assistant => m.content = content.into(),
            _ => self.messages.push(Message::assistant(content)),
        }
    }
}

impl From<Vec<Message>> for Conversation {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Result of seeding a user message: the cleared input box value and the
/// history to send.
#[derive(Debug, Clone, Serialize)]
pub struct SeededTurn {
    pub input: String,
    pub messages: Vec<Message>,
    pub context_reset: bool,
}

/// Appends a user message, restarting the conversation first when the
/// context has changed.
///
/// On a context change the history is cleared and re-seeded with exactly one
/// system message carrying the active prompt, and the flag is cleared.
pub fn seed_user_message(
    state: &mut SessionState,
    conversation: &mut Conversation,
    message: &str,
) -> SeededTurn {
    let context_reset = state.take_context_change();
    if context_reset {
        conversation.clear();
        conversation.push(Message::system(state.active_system_prompt()));
    }

    conversation.push(Message::user(message));

    SeededTurn {
        input: String::new(),
        messages: conversation.messages().to_vec(),
        context_reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::DEFAULT_SYSTEM_PROMPT;

    fn long_history() -> Conversation {
        Conversation::from(vec![
            Message::system("old persona"),
            Message::user("one"),
            Message::assistant("uno"),
            Message::user("two"),
            Message::assistant("dos"),
        ])
    }

    #[test]
    fn test_context_change_reseeds_single_system_message() {
        let mut state = SessionState::default();
        state.set_system_prompt("You explain code in simple terms.");
        let mut conversation = long_history();

        let turn = seed_user_message(&mut state, &mut conversation, "What is a trait?");

        assert!(turn.context_reset);
        assert_eq!(turn.input, "");
        assert_eq!(
            turn.messages,
            vec![
                Message::system("You explain code in simple terms."),
                Message::user("What is a trait?"),
            ]
        );
        assert_eq!(conversation.messages(), turn.messages.as_slice());
        assert!(!state.context_changed());
    }

    #[test]
    fn test_context_change_uses_default_prompt_when_none_set() {
        let mut state = SessionState::default();
        let mut conversation = Conversation::new();

        let turn = seed_user_message(&mut state, &mut conversation, "Tell me a joke about cats.");
        assert_eq!(turn.messages[0], Message::system(DEFAULT_SYSTEM_PROMPT));
    }

    #[test]
    fn test_unchanged_context_appends_to_history() {
        let mut state = SessionState::default();
        let mut conversation = Conversation::new();
        seed_user_message(&mut state, &mut conversation, "first");
        conversation.push(Message::assistant("reply"));

        let turn = seed_user_message(&mut state, &mut conversation, "second");

        assert!(!turn.context_reset);
        assert_eq!(turn.messages.len(), 4);
        assert_eq!(turn.messages[3], Message::user("second"));
        let system_count = turn
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .count();
        assert_eq!(system_count, 1);
    }

    #[test]
    fn test_model_switch_truncates_history() {
        let mut state = SessionState::default();
        let mut conversation = Conversation::new();
        seed_user_message(&mut state, &mut conversation, "first");
        conversation.push(Message::assistant("reply"));

        state.set_model("Gemini AI").unwrap();
        let turn = seed_user_message(&mut state, &mut conversation, "second");

        assert_eq!(turn.messages.len(), 2);
        assert_eq!(turn.messages[0].role, Role::System);
    }

    #[test]
    fn test_extend_assistant_grows_trailing_message() {
        let mut conversation = Conversation::from(vec![Message::user("hi")]);
        assert_eq!(conversation.extend_assistant("x"), None);

        conversation.begin_assistant();
        conversation.extend_assistant("Hel");
        assert_eq!(conversation.extend_assistant("lo"), Some("Hello"));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_replace_assistant_overwrites_partial_content() {
        let mut conversation = Conversation::from(vec![Message::user("hi")]);
        conversation.begin_assistant();
        conversation.extend_assistant("partial");
        conversation.replace_assistant("⚠️ boom");
        assert_eq!(conversation.last(), Some(&Message::assistant("⚠️ boom")));
        assert_eq!(conversation.len(), 2);
    }
}
