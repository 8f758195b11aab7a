use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use super::SessionSnapshot;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetModelRequest {
    pub model: String,
}

#[derive(Debug, Deserialize)]
pub struct SetSystemPromptRequest {
    #[serde(default)]
    pub prompt: String,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSnapshot>) {
    let shared = state.sessions.create().await;
    let snapshot = shared.lock().await.snapshot();
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = state.sessions.get(id).await?;
    let snapshot = shared.lock().await.snapshot();
    Ok(Json(snapshot))
}

/// DELETE /api/v1/sessions/:id
///
/// A turn still streaming keeps its own handle and finishes against the
/// detached session.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/model
///
/// Accepts a dropdown label ("Claude AI") or id ("claude"). The next message
/// starts a fresh conversation.
pub async fn handle_set_model(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetModelRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    let choice = session.state.set_model(&req.model)?;
    info!("Session {id}: model set to {}", choice.label());
    Ok(Json(session.snapshot()))
}

/// PUT /api/v1/sessions/:id/system-prompt
///
/// The new prompt takes effect on the next message, which starts a fresh
/// conversation.
pub async fn handle_set_system_prompt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetSystemPromptRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.state.set_system_prompt(req.prompt);
    Ok(Json(session.snapshot()))
}

/// DELETE /api/v1/sessions/:id/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;
    session.clear_history()?;
    Ok(Json(session.snapshot()))
}
