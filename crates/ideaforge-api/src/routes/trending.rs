use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use ideaforge_engine::TrendingIdea;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    pub app_type: Option<String>,
}

pub async fn get_trending_ideas(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TrendingQuery>,
) -> ApiResult<Json<Vec<TrendingIdea>>> {
    let ideas = state
        .engine
        .get_trending_ideas(query.app_type.as_deref())
        .await?;
    Ok(Json(ideas))
}
