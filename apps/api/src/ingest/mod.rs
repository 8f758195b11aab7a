// Ingest: turning uploads and job posting URLs into plain text.
// File parsing is blocking and runs inside tokio::task::spawn_blocking.

pub mod fetch;
pub mod files;
pub mod handlers;

pub use fetch::{fetch_job_description, FetchedPage};
pub use files::{is_read_error, supported_file_types};
