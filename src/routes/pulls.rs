//! Pull request route handlers

use crate::error::{validation_error, ApiResult};
use crate::models::{
    CreatePullRequestRequest, MergeRequest, PullRequestResponse, ReassignRequest,
    ReassignResponse,
};
use crate::state::SharedState;
use axum::{extract::State, http::StatusCode, Json};
use tracing::debug;
use validator::Validate;

/// Open a pull request; reviewers are assigned automatically
pub async fn create_pull_request(
    State(state): State<SharedState>,
    Json(payload): Json<CreatePullRequestRequest>,
) -> ApiResult<(StatusCode, Json<PullRequestResponse>)> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    debug!(
        "Creating PR '{}' authored by '{}'",
        payload.pull_request_id, payload.author_id
    );

    let pr = state
        .service
        .create_pull_request(
            &payload.pull_request_id,
            &payload.pull_request_name,
            &payload.author_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PullRequestResponse { pr })))
}

/// Merge a pull request (idempotent)
pub async fn merge_pull_request(
    State(state): State<SharedState>,
    Json(payload): Json<MergeRequest>,
) -> ApiResult<Json<PullRequestResponse>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let pr = state
        .service
        .merge_pull_request(&payload.pull_request_id)
        .await?;

    Ok(Json(PullRequestResponse { pr }))
}

/// Replace one reviewer on an open pull request
pub async fn reassign_reviewer(
    State(state): State<SharedState>,
    Json(payload): Json<ReassignRequest>,
) -> ApiResult<Json<ReassignResponse>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let (pr, replaced_by) = state
        .service
        .reassign_reviewer(&payload.pull_request_id, &payload.old_user_id)
        .await?;

    Ok(Json(ReassignResponse { pr, replaced_by }))
}
