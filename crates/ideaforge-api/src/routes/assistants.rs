use axum::extract::State;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use ideaforge_persist::{AssistantCategory, OutputShape};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Client-facing assistant summary. Prompt templates stay server-side.
#[derive(Debug, Serialize)]
pub struct AssistantView {
    pub id: String,
    pub name: String,
    pub category: AssistantCategory,
    pub description: String,
    pub app_type: String,
    pub output_shape: OutputShape,
    pub refinement_options: Vec<String>,
}

pub async fn list_assistants(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<AssistantView>>> {
    let assistants = state
        .persist
        .assistants()
        .list_active()
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let views = assistants
        .into_iter()
        .map(|a| AssistantView {
            id: a.id.to_hex(),
            name: a.name,
            category: a.category,
            description: a.description,
            app_type: a.app_type,
            output_shape: a.output_format.shape,
            refinement_options: a.app_settings.refinement_options,
        })
        .collect();

    Ok(Json(views))
}
