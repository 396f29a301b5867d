//! Team route handlers

use crate::error::{validation_error, ApiResult};
use crate::models::{
    BulkDeactivateRequest, BulkDeactivateResponse, Team, TeamQuery, TeamResponse,
};
use crate::state::SharedState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;
use validator::Validate;

/// Create a team and upsert its member roster
pub async fn add_team(
    State(state): State<SharedState>,
    Json(payload): Json<Team>,
) -> ApiResult<(StatusCode, Json<TeamResponse>)> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    debug!(
        "Adding team '{}' with {} members",
        payload.team_name,
        payload.members.len()
    );

    let team = state.service.create_team(payload).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse { team })))
}

/// Fetch a team with its full roster
pub async fn get_team(
    State(state): State<SharedState>,
    Query(params): Query<TeamQuery>,
) -> ApiResult<Json<Team>> {
    if params.team_name.is_empty() {
        return Err(validation_error("team_name parameter is required"));
    }

    let team = state.service.get_team(&params.team_name).await?;

    Ok(Json(team))
}

/// Deactivate a whole team and reassign the reviews its members held
pub async fn bulk_deactivate(
    State(state): State<SharedState>,
    Json(payload): Json<BulkDeactivateRequest>,
) -> ApiResult<Json<BulkDeactivateResponse>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let result = state.service.bulk_deactivate(&payload.team_name).await?;

    Ok(Json(result))
}
