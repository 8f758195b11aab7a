//! Read-only catalogs the UI builds its controls from.

use axum::Json;
use serde::Serialize;

use crate::ingest::supported_file_types;
use crate::llm_client::ModelChoice;
use crate::prompts::default_system_prompt;
use crate::prompts::study_notes::{
    QuickQuestionCategory, ANSWER_STYLES, DEFAULT_DEPTH, DEFAULT_STYLE, MAX_DEPTH, MIN_DEPTH,
    QUICK_QUESTIONS,
};
use crate::tabs::TabId;

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: ModelChoice,
}

#[derive(Debug, Serialize)]
pub struct TabInfo {
    pub id: TabId,
    pub name: &'static str,
    pub system_prompt: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DepthRange {
    pub min: u8,
    pub max: u8,
    pub default: u8,
}

#[derive(Debug, Serialize)]
pub struct StudyNotesOptions {
    pub answer_styles: &'static [&'static str],
    pub default_style: &'static str,
    pub depth: DepthRange,
    pub quick_questions: &'static [QuickQuestionCategory],
    pub file_types: &'static [&'static str],
}

/// GET /api/v1/models
pub async fn handle_list_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: ModelChoice::all()
            .into_iter()
            .map(|c| ModelInfo {
                id: c.id(),
                label: c.label(),
            })
            .collect(),
        default: ModelChoice::default(),
    })
}

/// GET /api/v1/tabs
pub async fn handle_list_tabs() -> Json<Vec<TabInfo>> {
    Json(
        TabId::all()
            .into_iter()
            .map(|id| TabInfo {
                id,
                name: id.display_name(),
                system_prompt: default_system_prompt(id),
            })
            .collect(),
    )
}

/// GET /api/v1/study-notes/options
pub async fn handle_study_notes_options() -> Json<StudyNotesOptions> {
    Json(StudyNotesOptions {
        answer_styles: ANSWER_STYLES,
        default_style: DEFAULT_STYLE,
        depth: DepthRange {
            min: MIN_DEPTH,
            max: MAX_DEPTH,
            default: DEFAULT_DEPTH,
        },
        quick_questions: QUICK_QUESTIONS,
        file_types: supported_file_types(),
    })
}
