//! Study notes tab: notes in, grounded Q&A out.

use serde::Serialize;

use super::{start_turn, PhaseTrigger, TabError, TabId, TabPhase};
use crate::ingest::is_read_error;
use crate::prompts::build_qna_prompt;
use crate::session::{SeededTurn, Session};

#[derive(Debug, Clone, Serialize)]
pub struct NotesProcessed {
    pub phase: TabPhase,
    pub characters: usize,
}

/// Process Notes. Stores pasted or extracted notes and moves the tab to
/// chat. Notes are only accepted from the input phase; blank content sends
/// the tab back to input.
pub fn process_notes(session: &mut Session, content: &str) -> Result<NotesProcessed, TabError> {
    session.ensure_idle()?;
    let tab = TabId::StudyNotes;
    let from = session.tabs.phase(tab);
    if from != TabPhase::Input {
        return Err(TabError::InvalidTransition {
            tab: tab.as_str(),
            from,
            trigger: PhaseTrigger::Submit,
        });
    }
    session.tabs.transition(tab, PhaseTrigger::Submit)?;

    let content = content.trim();
    if content.is_empty() {
        session.tabs.transition(tab, PhaseTrigger::Rejected)?;
        return Err(TabError::EmptyInput("notes"));
    }

    session.tabs.state_mut(tab).notes = content.to_string();
    let phase = session.tabs.transition(tab, PhaseTrigger::Completed)?;
    Ok(NotesProcessed {
        phase,
        characters: content.chars().count(),
    })
}

/// Process Notes from an uploaded file. A file reader error is reported
/// as such and never stored as notes.
pub fn process_upload(session: &mut Session, extracted: &str) -> Result<NotesProcessed, TabError> {
    if is_read_error(extracted) {
        return Err(TabError::Unreadable(extracted.to_string()));
    }
    process_notes(session, extracted)
}

/// Ask a question about the processed notes.
pub fn ask(
    session: &mut Session,
    question: &str,
    styles: &[String],
    depth: u8,
) -> Result<SeededTurn, TabError> {
    session.ensure_idle()?;
    let notes = match session.tabs.get(TabId::StudyNotes) {
        Some(state) if !state.notes.is_empty() && state.phase == TabPhase::Chat => {
            state.notes.clone()
        }
        _ => return Err(TabError::NotesMissing),
    };
    if question.trim().is_empty() {
        return Err(TabError::EmptyInput("question"));
    }

    let prompt = build_qna_prompt(&notes, question, styles, depth);
    start_turn(session, TabId::StudyNotes, &prompt)
}

/// New Notes: drops the stored notes and returns the tab to input. The chat
/// history is left alone.
pub fn new_notes(session: &mut Session) -> Result<(), TabError> {
    session.ensure_idle()?;
    session.tabs.transition(TabId::StudyNotes, PhaseTrigger::Reset)?;
    session.tabs.state_mut(TabId::StudyNotes).notes.clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Message;
    use crate::prompts::default_system_prompt;

    const NOTES: &str = "Photosynthesis converts light energy into chemical energy.";

    fn ready_session() -> Session {
        let mut session = Session::new();
        process_notes(&mut session, NOTES).unwrap();
        session
    }

    #[test]
    fn test_process_notes_moves_tab_to_chat() {
        let mut session = Session::new();
        let processed = process_notes(&mut session, &format!("  {NOTES}\n")).unwrap();

        assert_eq!(processed.phase, TabPhase::Chat);
        assert_eq!(processed.characters, NOTES.chars().count());
        assert_eq!(session.tabs.get(TabId::StudyNotes).unwrap().notes, NOTES);
    }

    #[test]
    fn test_blank_notes_return_to_input() {
        let mut session = Session::new();
        let err = process_notes(&mut session, " \n ").unwrap_err();
        assert!(matches!(err, TabError::EmptyInput("notes")));
        assert_eq!(session.tabs.phase(TabId::StudyNotes), TabPhase::Input);
    }

    #[test]
    fn test_upload_read_error_is_not_stored_as_notes() {
        let mut session = Session::new();
        let err = process_upload(&mut session, "Error reading file: invalid PDF").unwrap_err();
        assert!(matches!(err, TabError::Unreadable(ref msg) if msg.contains("invalid PDF")));
        assert!(session.tabs.get(TabId::StudyNotes).unwrap().notes.is_empty());
        assert_eq!(session.tabs.phase(TabId::StudyNotes), TabPhase::Input);
    }

    #[test]
    fn test_pasted_text_resembling_read_error_is_accepted() {
        let mut session = Session::new();
        let pasted = "Error reading file: a common log line students copy into notes.";
        let processed = process_notes(&mut session, pasted).unwrap();
        assert_eq!(processed.phase, TabPhase::Chat);
        assert_eq!(session.tabs.get(TabId::StudyNotes).unwrap().notes, pasted);
    }

    #[test]
    fn test_reprocessing_while_in_chat_keeps_existing_notes() {
        let mut session = ready_session();
        let err = process_notes(&mut session, "   ").unwrap_err();
        assert!(matches!(
            err,
            TabError::InvalidTransition {
                from: TabPhase::Chat,
                trigger: PhaseTrigger::Submit,
                ..
            }
        ));
        assert_eq!(session.tabs.phase(TabId::StudyNotes), TabPhase::Chat);
        assert_eq!(session.tabs.get(TabId::StudyNotes).unwrap().notes, NOTES);
        assert!(ask(&mut session, "What is converted?", &[], 3).is_ok());
    }

    #[test]
    fn test_new_notes_then_process_replaces_notes() {
        let mut session = ready_session();
        new_notes(&mut session).unwrap();
        process_notes(&mut session, "Mitochondria make ATP.").unwrap();
        assert_eq!(
            session.tabs.get(TabId::StudyNotes).unwrap().notes,
            "Mitochondria make ATP."
        );
    }

    #[test]
    fn test_ask_without_notes_is_rejected() {
        let mut session = Session::new();
        let err = ask(&mut session, "What is it?", &[], 3).unwrap_err();
        assert!(matches!(err, TabError::NotesMissing));
        assert!(session.conversation.is_empty());
    }

    #[test]
    fn test_ask_blank_question_is_rejected() {
        let mut session = ready_session();
        let err = ask(&mut session, "  ", &[], 3).unwrap_err();
        assert!(matches!(err, TabError::EmptyInput("question")));
        assert_eq!(session.tabs.phase(TabId::StudyNotes), TabPhase::Chat);
    }

    #[test]
    fn test_ask_seeds_grounded_prompt_under_tutor_persona() {
        let mut session = ready_session();
        let styles = vec!["Concise".to_string()];
        let seeded = ask(&mut session, "What does photosynthesis produce?", &styles, 2).unwrap();

        assert_eq!(
            seeded.messages,
            vec![
                Message::system(default_system_prompt(TabId::StudyNotes)),
                Message::user(build_qna_prompt(
                    NOTES,
                    "What does photosynthesis produce?",
                    &styles,
                    2
                )),
            ]
        );
        assert_eq!(session.tabs.phase(TabId::StudyNotes), TabPhase::Processing);
    }

    #[test]
    fn test_follow_up_questions_chain_in_chat() {
        let mut session = ready_session();
        ask(&mut session, "First?", &[], 3).unwrap();
        let mut history = session.conversation.clone();
        history.push(Message::assistant("Answer one."));
        session.finish_turn(history);

        let seeded = ask(&mut session, "Second?", &[], 3).unwrap();
        assert!(!seeded.context_reset);
        assert_eq!(seeded.messages.len(), 4);
    }

    #[test]
    fn test_new_notes_resets_tab_but_keeps_history() {
        let mut session = ready_session();
        ask(&mut session, "First?", &[], 3).unwrap();
        let mut history = session.conversation.clone();
        history.push(Message::assistant("Answer."));
        session.finish_turn(history);

        new_notes(&mut session).unwrap();
        assert_eq!(session.tabs.phase(TabId::StudyNotes), TabPhase::Input);
        assert!(session.tabs.get(TabId::StudyNotes).unwrap().notes.is_empty());
        assert_eq!(session.conversation.len(), 3);
        assert!(matches!(
            ask(&mut session, "Again?", &[], 3),
            Err(TabError::NotesMissing)
        ));
    }
}
