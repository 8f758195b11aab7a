// Prompt builders: pure functions that turn raw tab inputs into one
// instruction string. No I/O, no clocks, no randomness.

pub mod job_match;
pub mod study_notes;
pub mod topics;

pub use job_match::build_match_prompt;
pub use study_notes::build_qna_prompt;
pub use topics::default_system_prompt;
