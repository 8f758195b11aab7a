use crate::tabs::TabId;

/// Persona each tab installs as its system prompt.
pub fn default_system_prompt(tab: TabId) -> &'static str {
    match tab {
        TabId::Recipe => {
            "You are a helpful chef assistant. Ask clarifying questions and suggest recipes."
        }
        TabId::StudyNotes => {
            "You help students with Q&A based on study notes. Keep answers concise and structured."
        }
        TabId::JobMatch => {
            "You assist with matching candidate skills to job descriptions and suggest improvements."
        }
        TabId::CodeExplainer => {
            "You explain code in simple terms with step-by-step reasoning and examples."
        }
        TabId::VirtualCaseStudy => {
            "You create realistic case studies with constraints and questions for analysis."
        }
    }
}
