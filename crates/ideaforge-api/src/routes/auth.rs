use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use std::sync::Arc;

use crate::auth::{AuthOutcome, LoginRequest, RegisterRequest};
use crate::error::ApiResult;
use crate::identity::extract_device_info;
use crate::state::AppState;

/// Register a new account. A device fingerprint on the request promotes the
/// matching anonymous user in place, preserving thread ownership.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<Json<AuthOutcome>> {
    let device = extract_device_info(&headers);
    let outcome = state.auth.register(device, request).await?;
    Ok(Json(outcome))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<AuthOutcome>> {
    let outcome = state.auth.login(request).await?;
    Ok(Json(outcome))
}
