use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::study_notes::NotesProcessed;
use super::{generic, job_match, study_notes, TabError, TabId, TabPhase};
use crate::chat::{spawn_turn, TurnSse};
use crate::errors::AppError;
use crate::ingest::fetch_job_description;
use crate::ingest::handlers::{extract_upload, next_upload};
use crate::prompts::study_notes::{DEFAULT_DEPTH, DEFAULT_STYLE};
use crate::session::{SeededTurn, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct JobMatchRequest {
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub resume: String,
}

#[derive(Debug, Deserialize)]
pub struct FetchJobRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct FetchJobResponse {
    pub url: String,
    pub job_description: String,
    pub ok: bool,
}

#[derive(Debug, Deserialize)]
pub struct PasteNotesRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default = "default_styles")]
    pub styles: Vec<String>,
    #[serde(default = "default_depth")]
    pub depth: u8,
}

#[derive(Debug, Serialize)]
pub struct TabPhaseResponse {
    pub tab: TabId,
    pub phase: TabPhase,
}

fn default_styles() -> Vec<String> {
    vec![DEFAULT_STYLE.to_string()]
}

fn default_depth() -> u8 {
    DEFAULT_DEPTH
}

fn parse_tab(tab: &str) -> Result<TabId, AppError> {
    TabId::parse(tab).ok_or_else(|| AppError::NotFound(format!("Tab '{tab}' not found")))
}

/// Seeds a turn under the session lock, then streams it.
///
/// The provider is resolved before seeding so an unconfigured model leaves
/// the history untouched.
async fn run_turn<F>(state: &AppState, id: Uuid, seed: F) -> Result<TurnSse, AppError>
where
    F: FnOnce(&mut Session) -> Result<SeededTurn, TabError>,
{
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    let model = session.state.model();
    let provider = state.llm.provider(model)?;
    let seeded = seed(&mut *session)?;
    let history = session.conversation.clone();
    drop(session);

    info!(
        "Session {id}: streaming {} turn ({} messages)",
        model.label(),
        history.len()
    );
    Ok(spawn_turn(state.stream_mode, provider, shared, history, seeded))
}

/// POST /api/v1/sessions/:id/tabs/:tab/messages
pub async fn handle_send_message(
    State(state): State<AppState>,
    Path((id, tab)): Path<(Uuid, String)>,
    Json(req): Json<SendMessageRequest>,
) -> Result<TurnSse, AppError> {
    let tab = parse_tab(&tab)?;
    run_turn(&state, id, |session| {
        generic::submit_message(session, tab, &req.message)
    })
    .await
}

/// POST /api/v1/sessions/:id/tabs/:tab/clear
pub async fn handle_clear_tab(
    State(state): State<AppState>,
    Path((id, tab)): Path<(Uuid, String)>,
) -> Result<Json<TabPhaseResponse>, AppError> {
    let tab = parse_tab(&tab)?;
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    generic::clear(&mut session, tab)?;
    Ok(Json(TabPhaseResponse {
        tab,
        phase: session.tabs.phase(tab),
    }))
}

/// POST /api/v1/sessions/:id/job-match
pub async fn handle_job_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<JobMatchRequest>,
) -> Result<TurnSse, AppError> {
    run_turn(&state, id, |session| {
        job_match::submit_match(session, &req.job_description, &req.resume)
    })
    .await
}

/// POST /api/v1/sessions/:id/job-match/fetch
///
/// A failed fetch is reported as `ok: false` with the error text; it is not
/// an HTTP error.
pub async fn handle_fetch_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<FetchJobRequest>,
) -> Result<Json<FetchJobResponse>, AppError> {
    let shared = state.sessions.get(id).await?;
    let page = fetch_job_description(&state.http, &req.url).await;
    job_match::apply_fetched(&mut *shared.lock().await, &page);

    Ok(Json(FetchJobResponse {
        url: page.url,
        job_description: page.text,
        ok: page.ok,
    }))
}

/// POST /api/v1/sessions/:id/study-notes/notes
pub async fn handle_paste_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<PasteNotesRequest>,
) -> Result<Json<NotesProcessed>, AppError> {
    let shared = state.sessions.get(id).await?;
    let processed = study_notes::process_notes(&mut *shared.lock().await, &req.text)?;
    info!("Session {id}: processed {} chars of notes", processed.characters);
    Ok(Json(processed))
}

/// POST /api/v1/sessions/:id/study-notes/upload
pub async fn handle_upload_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<NotesProcessed>, AppError> {
    let shared = state.sessions.get(id).await?;
    let upload = next_upload(&mut multipart).await?;
    let text = extract_upload(upload).await?;
    let processed = study_notes::process_upload(&mut *shared.lock().await, &text)?;
    info!("Session {id}: processed {} chars of uploaded notes", processed.characters);
    Ok(Json(processed))
}

/// POST /api/v1/sessions/:id/study-notes/ask
pub async fn handle_ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AskRequest>,
) -> Result<TurnSse, AppError> {
    run_turn(&state, id, |session| {
        study_notes::ask(session, &req.question, &req.styles, req.depth)
    })
    .await
}

/// POST /api/v1/sessions/:id/study-notes/reset
pub async fn handle_new_notes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TabPhaseResponse>, AppError> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    study_notes::new_notes(&mut session)?;
    Ok(Json(TabPhaseResponse {
        tab: TabId::StudyNotes,
        phase: session.tabs.phase(TabId::StudyNotes),
    }))
}
