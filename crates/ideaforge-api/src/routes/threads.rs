use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use ideaforge_engine::{ChatHistoryEntry, ThreadChatOutcome};

use super::parse_thread_id;
use crate::error::{ApiError, ApiResult};
use crate::identity::CallerIdentity;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ThreadSummaryView {
    pub id: String,
    pub title: String,
    pub app_type: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

pub async fn list_threads(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
) -> ApiResult<Json<Vec<ThreadSummaryView>>> {
    let threads = state
        .persist
        .threads()
        .list_for_user(identity.user_id)
        .await
        .map_err(|e| ApiError::Internal(e.into()))?;

    let views = threads
        .into_iter()
        .map(|t| ThreadSummaryView {
            id: t.id.to_hex(),
            title: t.title,
            app_type: t.metadata.app_type,
            updated_at: t.updated_at,
        })
        .collect();

    Ok(Json(views))
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(thread_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<Json<ThreadChatOutcome>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let outcome = state
        .engine
        .send_thread_message(identity.user_id, thread_id, request.content)
        .await?;
    Ok(Json(outcome))
}

pub async fn list_messages(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<Vec<ChatHistoryEntry>>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let history = state
        .engine
        .get_thread_chat_history(identity.user_id, thread_id)
        .await?;
    Ok(Json(history))
}
