//! Free chat on any tab under that tab's persona.

use super::{start_turn, PhaseTrigger, TabError, TabId};
use crate::session::{SeededTurn, Session};

/// Sends a typed message on `tab`.
pub fn submit_message(
    session: &mut Session,
    tab: TabId,
    message: &str,
) -> Result<SeededTurn, TabError> {
    if message.trim().is_empty() {
        return Err(TabError::EmptyInput("message"));
    }
    start_turn(session, tab, message)
}

/// The Clear button: empties the chat. Tabs without a separate input phase
/// fall back to input; study notes stay in chat with their notes kept.
pub fn clear(session: &mut Session, tab: TabId) -> Result<(), TabError> {
    session.clear_history()?;
    if tab != TabId::StudyNotes {
        session.tabs.transition(tab, PhaseTrigger::Reset)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Role};
    use crate::prompts::default_system_prompt;
    use crate::session::Conversation;
    use crate::tabs::TabPhase;

    fn complete(session: &mut Session, reply: &str) {
        let mut history = session.conversation.clone();
        history.push(Message::assistant(reply));
        session.finish_turn(history);
    }

    #[test]
    fn test_blank_message_is_rejected() {
        let mut session = Session::new();
        let err = submit_message(&mut session, TabId::Recipe, "   ").unwrap_err();
        assert!(matches!(err, TabError::EmptyInput("message")));
        assert!(session.conversation.is_empty());
        assert_eq!(session.tabs.phase(TabId::Recipe), TabPhase::Input);
    }

    #[test]
    fn test_follow_up_on_same_tab_keeps_history() {
        let mut session = Session::new();
        submit_message(&mut session, TabId::CodeExplainer, "What is a closure?").unwrap();
        complete(&mut session, "A function value.");
        assert_eq!(session.tabs.phase(TabId::CodeExplainer), TabPhase::Chat);

        let seeded = submit_message(&mut session, TabId::CodeExplainer, "Example?").unwrap();
        assert!(!seeded.context_reset);
        assert_eq!(seeded.messages.len(), 4);
    }

    #[test]
    fn test_switching_tab_resets_context() {
        let mut session = Session::new();
        submit_message(&mut session, TabId::CodeExplainer, "What is a closure?").unwrap();
        complete(&mut session, "A function value.");

        let seeded = submit_message(&mut session, TabId::Recipe, "Pasta tonight?").unwrap();
        assert!(seeded.context_reset);
        assert_eq!(
            seeded.messages,
            vec![
                Message::system(default_system_prompt(TabId::Recipe)),
                Message::user("Pasta tonight?"),
            ]
        );
    }

    #[test]
    fn test_clear_empties_chat_and_reseeds_next_message() {
        let mut session = Session::new();
        submit_message(&mut session, TabId::Recipe, "Soup?").unwrap();
        complete(&mut session, "Minestrone.");

        clear(&mut session, TabId::Recipe).unwrap();
        assert_eq!(session.conversation, Conversation::new());
        assert_eq!(session.tabs.phase(TabId::Recipe), TabPhase::Input);

        let seeded = submit_message(&mut session, TabId::Recipe, "Salad?").unwrap();
        assert_eq!(seeded.messages[0].role, Role::System);
    }
}
