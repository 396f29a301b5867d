//! Stats route handler

use crate::error::ApiResult;
use crate::models::StatsResponse;
use crate::state::SharedState;
use axum::{extract::State, Json};

/// Aggregate reviewer-load and coverage statistics
pub async fn get_stats(State(state): State<SharedState>) -> ApiResult<Json<StatsResponse>> {
    let stats = state.service.stats().await?;
    Ok(Json(stats))
}
