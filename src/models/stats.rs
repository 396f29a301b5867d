//! Aggregate statistics models for `GET /stats`.

use crate::models::pull_request::PrStatus;
use serde::Serialize;

/// Per-user reviewer load.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub user_id: String,
    pub username: String,
    pub assigned_prs_count: i64,
}

/// Per-PR reviewer coverage.
#[derive(Debug, Clone, Serialize)]
pub struct PrStats {
    pub pull_request_id: String,
    pub pull_request_name: String,
    pub reviewers_count: i64,
    pub status: PrStatus,
}

/// Response for `GET /stats`.
///
/// Users are ordered by assigned count descending then user id; PRs by
/// reviewer count descending then PR id.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub users_stats: Vec<UserStats>,
    pub prs_stats: Vec<PrStats>,
    pub total_users: i64,
    pub total_prs: i64,
}
