use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::session::SessionError;
use crate::tabs::TabError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => AppError::NotFound(err.to_string()),
            SessionError::UnknownModel(_) => AppError::Validation(err.to_string()),
            SessionError::TurnInFlight => AppError::Conflict(err.to_string()),
        }
    }
}

impl From<TabError> for AppError {
    fn from(err: TabError) -> Self {
        match err {
            TabError::Session(inner) => inner.into(),
            TabError::InvalidTransition { .. } => AppError::Conflict(err.to_string()),
            TabError::EmptyInput(_) | TabError::NotesMissing | TabError::Unreadable(_) => {
                AppError::Validation(err.to_string())
            }
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        AppError::Llm(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI provider error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_session_errors_map_to_http_kinds() {
        assert!(matches!(
            AppError::from(SessionError::NotFound(Uuid::nil())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(SessionError::UnknownModel("x".into())),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(SessionError::TurnInFlight),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_tab_errors_map_to_http_kinds() {
        assert!(matches!(
            AppError::from(TabError::NotesMissing),
            AppError::Validation(_)
        ));
        assert!(matches!(
            AppError::from(TabError::Session(SessionError::TurnInFlight)),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_payload_too_large_response_status() {
        let response = AppError::PayloadTooLarge("10 MiB max".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_conflict_response_status() {
        let response = AppError::Conflict("busy".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
