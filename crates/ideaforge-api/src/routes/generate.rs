use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use ideaforge_engine::{
    CardChatOutcome, CardChatRequest, ChatHistoryEntry, GenerateOutcome, GenerateRequest,
    RefineOutcome, RefineRequest, SaveOutcome, SaveRequest, ShareOutcome, ShareRequest, ThreadView,
};

use super::parse_thread_id;
use crate::error::ApiResult;
use crate::identity::CallerIdentity;
use crate::state::AppState;

pub async fn generate_content(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateOutcome>> {
    let outcome = state
        .engine
        .generate_content(identity.user_id, request)
        .await?;
    Ok(Json(outcome))
}

pub async fn refine_content(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(thread_id): Path<String>,
    Json(request): Json<RefineRequest>,
) -> ApiResult<Json<RefineOutcome>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let outcome = state
        .engine
        .refine_content(identity.user_id, thread_id, request)
        .await?;
    Ok(Json(outcome))
}

pub async fn save_idea(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(thread_id): Path<String>,
    Json(request): Json<SaveRequest>,
) -> ApiResult<Json<SaveOutcome>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let outcome = state
        .engine
        .save_idea(identity.user_id, thread_id, request)
        .await?;
    Ok(Json(outcome))
}

pub async fn share_idea(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(thread_id): Path<String>,
    Json(request): Json<ShareRequest>,
) -> ApiResult<Json<ShareOutcome>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let outcome = state
        .engine
        .share_idea(identity.user_id, thread_id, request)
        .await?;
    Ok(Json(outcome))
}

pub async fn chat_with_card(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(thread_id): Path<String>,
    Json(request): Json<CardChatRequest>,
) -> ApiResult<Json<CardChatOutcome>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let outcome = state
        .engine
        .chat_with_card(identity.user_id, thread_id, request)
        .await?;
    Ok(Json(outcome))
}

pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path(thread_id): Path<String>,
) -> ApiResult<Json<ThreadView>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let view = state.engine.get_thread(identity.user_id, thread_id).await?;
    Ok(Json(view))
}

pub async fn get_card_chat_history(
    State(state): State<Arc<AppState>>,
    identity: CallerIdentity,
    Path((thread_id, card_id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<ChatHistoryEntry>>> {
    let thread_id = parse_thread_id(&thread_id)?;
    let history = state
        .engine
        .get_chat_history_by_card(identity.user_id, thread_id, &card_id)
        .await?;
    Ok(Json(history))
}
