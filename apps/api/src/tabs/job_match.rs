//! Job match tab: job description + resume in, match analysis out.

use super::{start_turn, TabError, TabId};
use crate::ingest::FetchedPage;
use crate::prompts::build_match_prompt;
use crate::session::{SeededTurn, Session};

/// Match Candidate to Job. Empty fields are sent as empty sections.
pub fn submit_match(
    session: &mut Session,
    job_description: &str,
    resume: &str,
) -> Result<SeededTurn, TabError> {
    session.ensure_idle()?;

    let state = session.tabs.state_mut(TabId::JobMatch);
    state.job_description = job_description.to_string();
    state.resume = resume.to_string();

    let prompt = build_match_prompt(job_description, resume);
    start_turn(session, TabId::JobMatch, &prompt)
}

/// Stores a fetched posting as the tab's job description. A failed fetch
/// leaves the previous description in place. Returns whether it was stored.
pub fn apply_fetched(session: &mut Session, page: &FetchedPage) -> bool {
    if page.ok {
        session.tabs.state_mut(TabId::JobMatch).job_description = page.text.clone();
    }
    page.ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::default_system_prompt;
    use crate::tabs::TabPhase;

    #[test]
    fn test_submit_match_seeds_match_prompt_under_job_persona() {
        let mut session = Session::new();
        let seeded = submit_match(&mut session, "Rust engineer", "Rustacean").unwrap();

        assert_eq!(seeded.messages[0].content, default_system_prompt(TabId::JobMatch));
        assert_eq!(seeded.messages[1].content, build_match_prompt("Rust engineer", "Rustacean"));
        assert_eq!(session.tabs.phase(TabId::JobMatch), TabPhase::Processing);

        let state = session.tabs.get(TabId::JobMatch).unwrap();
        assert_eq!(state.job_description, "Rust engineer");
        assert_eq!(state.resume, "Rustacean");
    }

    #[test]
    fn test_submit_match_allows_empty_inputs() {
        let mut session = Session::new();
        let seeded = submit_match(&mut session, "", "").unwrap();
        assert!(seeded.messages[1].content.contains("Job Description:\n\n"));
    }

    #[test]
    fn test_failed_fetch_keeps_previous_description() {
        let mut session = Session::new();
        session.tabs.state_mut(TabId::JobMatch).job_description = "pasted".to_string();

        let stored = apply_fetched(
            &mut session,
            &FetchedPage {
                url: "https://example.com".to_string(),
                text: "Error fetching job description: 404".to_string(),
                ok: false,
            },
        );
        assert!(!stored);
        assert_eq!(
            session.tabs.get(TabId::JobMatch).unwrap().job_description,
            "pasted"
        );
    }

    #[test]
    fn test_successful_fetch_replaces_description() {
        let mut session = Session::new();
        let stored = apply_fetched(
            &mut session,
            &FetchedPage {
                url: "https://example.com/job".to_string(),
                text: "Senior Rust Engineer".to_string(),
                ok: true,
            },
        );
        assert!(stored);
        assert_eq!(
            session.tabs.get(TabId::JobMatch).unwrap().job_description,
            "Senior Rust Engineer"
        );
    }
}
