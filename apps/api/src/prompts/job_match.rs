/// Task framing for the job match tab.
pub const MATCH_INSTRUCTION: &str = "Please analyze the following job description and candidate profile. \
Provide: 1) Match score (0-100) 2) Key matching skills 3) Gaps and suggestions 4) A brief tailored summary.";

/// Builds the job-match request. Both inputs are embedded verbatim; empty
/// inputs leave their section empty.
pub fn build_match_prompt(job_description: &str, resume: &str) -> String {
    format!(
        "{MATCH_INSTRUCTION}\n\nJob Description:\n{job_description}\n\nCandidate Profile:\n{resume}"
    )
}
