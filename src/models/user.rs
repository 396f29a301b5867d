//! User models and user-related request/response types.

use crate::models::pull_request::PullRequestShort;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A user, always affiliated with exactly one team.
///
/// The active flag controls eligibility as a reviewer candidate; inactive
/// users keep their existing assignments until reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub team_name: String,
    pub is_active: bool,
}

/// Request body for `POST /users/setIsActive`
#[derive(Debug, Deserialize, Validate)]
pub struct SetActiveRequest {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
    pub is_active: bool,
}

/// Query parameters for `GET /users/getReview`
#[derive(Debug, Deserialize)]
pub struct UserReviewQuery {
    pub user_id: String,
}

/// Response wrapper for user endpoints
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Response for `GET /users/getReview`
#[derive(Debug, Serialize)]
pub struct ReviewQueueResponse {
    pub user_id: String,
    pub pull_requests: Vec<PullRequestShort>,
}
