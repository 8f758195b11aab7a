// Tab controllers: each task tab is a small phase machine
// (input -> processing -> chat, reset -> input) wired to prompt builders
// and the streaming driver.

pub mod generic;
pub mod handlers;
pub mod job_match;
pub mod phase;
pub mod study_notes;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::prompts::default_system_prompt;
use crate::session::{seed_user_message, SeededTurn, Session, SessionError, SessionState};

pub use phase::{PhaseTrigger, TabPhase};

/// The task tabs offered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TabId {
    Recipe,
    StudyNotes,
    JobMatch,
    CodeExplainer,
    VirtualCaseStudy,
}

impl TabId {
    pub fn all() -> [TabId; 5] {
        [
            TabId::Recipe,
            TabId::StudyNotes,
            TabId::JobMatch,
            TabId::CodeExplainer,
            TabId::VirtualCaseStudy,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TabId::Recipe => "recipe",
            TabId::StudyNotes => "study_notes",
            TabId::JobMatch => "job_match",
            TabId::CodeExplainer => "code_explainer",
            TabId::VirtualCaseStudy => "virtual_case_study",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TabId::Recipe => "Recipe Recommendation",
            TabId::StudyNotes => "Study Notes Question And Answer",
            TabId::JobMatch => "Basic Job Match Assistant",
            TabId::CodeExplainer => "Simple Code Explainer",
            TabId::VirtualCaseStudy => "Virtual Case Study Creator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::all()
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(value))
    }
}

#[derive(Debug, Error)]
pub enum TabError {
    #[error("Tab '{tab}' cannot {trigger} while {from}")]
    InvalidTransition {
        tab: &'static str,
        from: TabPhase,
        trigger: PhaseTrigger,
    },

    #[error("{0} cannot be empty")]
    EmptyInput(&'static str),

    #[error("No study notes available. Please process notes first.")]
    NotesMissing,

    #[error("{0}")]
    Unreadable(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Per-tab UI state. Text fields are held only for the session's lifetime.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TabState {
    pub phase: TabPhase,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub job_description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resume: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct TabBoard {
    tabs: BTreeMap<TabId, TabState>,
}

impl Default for TabBoard {
    fn default() -> Self {
        Self {
            tabs: TabId::all()
                .into_iter()
                .map(|t| (t, TabState::default()))
                .collect(),
        }
    }
}

impl TabBoard {
    pub fn get(&self, tab: TabId) -> Option<&TabState> {
        self.tabs.get(&tab)
    }

    pub fn phase(&self, tab: TabId) -> TabPhase {
        self.get(tab).map(|t| t.phase).unwrap_or_default()
    }

    pub fn state_mut(&mut self, tab: TabId) -> &mut TabState {
        self.tabs.entry(tab).or_default()
    }

    /// Applies a phase trigger, rejecting transitions the machine does not
    /// allow.
    pub fn transition(&mut self, tab: TabId, trigger: PhaseTrigger) -> Result<TabPhase, TabError> {
        let state = self.state_mut(tab);
        let next = state
            .phase
            .next(trigger)
            .ok_or(TabError::InvalidTransition {
                tab: tab.as_str(),
                from: state.phase,
                trigger,
            })?;
        state.phase = next;
        Ok(next)
    }
}

/// Installs `tab`'s persona unless it is already the active system prompt,
/// so follow-up messages on the same tab keep their history.
pub fn activate_tab(state: &mut SessionState, tab: TabId) {
    let prompt = default_system_prompt(tab);
    if state.system_prompt() != Some(prompt) {
        state.set_system_prompt(prompt);
    }
}

/// Moves `tab` into processing and seeds `prompt` as the next user message.
/// The caller has validated its inputs; on success the session owns an
/// outstanding turn that `Session::finish_turn` later releases.
pub(crate) fn start_turn(
    session: &mut Session,
    tab: TabId,
    prompt: &str,
) -> Result<SeededTurn, TabError> {
    session.ensure_idle()?;
    session.tabs.transition(tab, PhaseTrigger::Submit)?;
    activate_tab(&mut session.state, tab);
    let seeded = seed_user_message(&mut session.state, &mut session.conversation, prompt);
    session.begin_turn(tab)?;
    Ok(seeded)
}
