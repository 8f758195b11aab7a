use std::fmt;

use serde::Serialize;

/// Where a tab is in its flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TabPhase {
    /// Collecting inputs (notes, job description, first message).
    #[default]
    Input,
    /// A submission is being processed or a response is streaming.
    Processing,
    /// Showing the conversation; follow-up submissions are allowed.
    Chat,
}

/// UI events that move a tab between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTrigger {
    /// Process / ask / match / send clicked.
    Submit,
    /// Processing finished (including a turn that ended in an error message).
    Completed,
    /// Processing found nothing usable, e.g. empty notes.
    Rejected,
    /// New notes / clear.
    Reset,
}

impl TabPhase {
    /// The phase `trigger` leads to, or `None` if the transition is invalid.
    pub fn next(self, trigger: PhaseTrigger) -> Option<TabPhase> {
        use PhaseTrigger::*;
        use TabPhase::*;

        match (self, trigger) {
            (_, Reset) => Some(Input),
            (Input | Chat, Submit) => Some(Processing),
            (Processing, Completed) => Some(Chat),
            (Processing, Rejected) => Some(Input),
            _ => None,
        }
    }
}

impl fmt::Display for TabPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TabPhase::Input => "in input phase",
            TabPhase::Processing => "processing",
            TabPhase::Chat => "in chat phase",
        };
        f.write_str(name)
    }
}

impl fmt::Display for PhaseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseTrigger::Submit => "submit",
            PhaseTrigger::Completed => "complete",
            PhaseTrigger::Rejected => "reject",
            PhaseTrigger::Reset => "reset",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_input_processing_chat() {
        let phase = TabPhase::Input;
        let phase = phase.next(PhaseTrigger::Submit).unwrap();
        assert_eq!(phase, TabPhase::Processing);
        let phase = phase.next(PhaseTrigger::Completed).unwrap();
        assert_eq!(phase, TabPhase::Chat);
    }

    #[test]
    fn test_follow_up_from_chat_goes_back_to_processing() {
        assert_eq!(
            TabPhase::Chat.next(PhaseTrigger::Submit),
            Some(TabPhase::Processing)
        );
    }

    #[test]
    fn test_submit_while_processing_is_invalid() {
        assert_eq!(TabPhase::Processing.next(PhaseTrigger::Submit), None);
    }

    #[test]
    fn test_rejected_processing_returns_to_input() {
        assert_eq!(
            TabPhase::Processing.next(PhaseTrigger::Rejected),
            Some(TabPhase::Input)
        );
    }

    #[test]
    fn test_reset_always_returns_to_input() {
        for phase in [TabPhase::Input, TabPhase::Processing, TabPhase::Chat] {
            assert_eq!(phase.next(PhaseTrigger::Reset), Some(TabPhase::Input));
        }
    }

    #[test]
    fn test_completed_outside_processing_is_invalid() {
        assert_eq!(TabPhase::Input.next(PhaseTrigger::Completed), None);
        assert_eq!(TabPhase::Chat.next(PhaseTrigger::Completed), None);
    }
}
