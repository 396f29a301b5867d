//! User route handlers

use crate::error::{validation_error, ApiResult};
use crate::models::{ReviewQueueResponse, SetActiveRequest, UserResponse, UserReviewQuery};
use crate::state::SharedState;
use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

/// Flip a user's active flag
pub async fn set_is_active(
    State(state): State<SharedState>,
    Json(payload): Json<SetActiveRequest>,
) -> ApiResult<Json<UserResponse>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let user = state
        .service
        .set_user_active(&payload.user_id, payload.is_active)
        .await?;

    Ok(Json(UserResponse { user }))
}

/// List the pull requests a user currently reviews
pub async fn get_review(
    State(state): State<SharedState>,
    Query(params): Query<UserReviewQuery>,
) -> ApiResult<Json<ReviewQueueResponse>> {
    if params.user_id.is_empty() {
        return Err(validation_error("user_id parameter is required"));
    }

    let pull_requests = state.service.user_review_queue(&params.user_id).await?;

    Ok(Json(ReviewQueueResponse {
        user_id: params.user_id,
        pull_requests,
    }))
}
