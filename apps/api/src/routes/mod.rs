pub mod catalog;
pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::ingest::handlers as ingest;
use crate::session::handlers as sessions;
use crate::state::AppState;
use crate::tabs::handlers as tabs;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Catalogs
        .route("/api/v1/models", get(catalog::handle_list_models))
        .route("/api/v1/tabs", get(catalog::handle_list_tabs))
        .route(
            "/api/v1/study-notes/options",
            get(catalog::handle_study_notes_options),
        )
        .route(
            "/api/v1/files/extract",
            post(ingest::handle_extract_file).layer(upload_limit.clone()),
        )
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/model", put(sessions::handle_set_model))
        .route(
            "/api/v1/sessions/:id/system-prompt",
            put(sessions::handle_set_system_prompt),
        )
        .route(
            "/api/v1/sessions/:id/history",
            delete(sessions::handle_clear_history),
        )
        // Tabs
        .route(
            "/api/v1/sessions/:id/tabs/:tab/messages",
            post(tabs::handle_send_message),
        )
        .route(
            "/api/v1/sessions/:id/tabs/:tab/clear",
            post(tabs::handle_clear_tab),
        )
        .route("/api/v1/sessions/:id/job-match", post(tabs::handle_job_match))
        .route(
            "/api/v1/sessions/:id/job-match/fetch",
            post(tabs::handle_fetch_job),
        )
        .route(
            "/api/v1/sessions/:id/study-notes/notes",
            post(tabs::handle_paste_notes),
        )
        .route(
            "/api/v1/sessions/:id/study-notes/upload",
            post(tabs::handle_upload_notes).layer(upload_limit),
        )
        .route("/api/v1/sessions/:id/study-notes/ask", post(tabs::handle_ask))
        .route(
            "/api/v1/sessions/:id/study-notes/reset",
            post(tabs::handle_new_notes),
        )
        .with_state(state)
}
