//! Team models and team-related request/response types.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// One member row of a team roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub user_id: String,
    pub username: String,
    pub is_active: bool,
}

/// A team and its full roster, ordered by user id.
///
/// Doubles as the `POST /team/add` request body; member rows are upserted,
/// so re-posting a member moves them onto this team.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Team {
    #[validate(length(min = 1, message = "team_name is required"))]
    pub team_name: String,
    pub members: Vec<TeamMember>,
}

/// Query parameters for `GET /team/get`
#[derive(Debug, Deserialize)]
pub struct TeamQuery {
    pub team_name: String,
}

/// Response wrapper for team endpoints
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team: Team,
}

/// Request body for `POST /team/bulkDeactivate`
#[derive(Debug, Deserialize, Validate)]
pub struct BulkDeactivateRequest {
    #[validate(length(min = 1, message = "team_name is required"))]
    pub team_name: String,
}

/// Result of one bulk deactivation run.
///
/// `reassigned_prs` lists every pull request with at least one planned
/// replacement; it is not a guarantee that every link on those PRs was
/// replaced (links with no eligible candidate anywhere are left in place).
#[derive(Debug, Serialize)]
pub struct BulkDeactivateResponse {
    pub team_name: String,
    pub deactivated_users: Vec<String>,
    pub reassigned_prs: Vec<String>,
    pub deactivated_count: usize,
    pub reassigned_count: usize,
}

impl BulkDeactivateResponse {
    /// Result for a run that flipped nobody (already-inactive team).
    pub fn empty(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            deactivated_users: Vec::new(),
            reassigned_prs: Vec::new(),
            deactivated_count: 0,
            reassigned_count: 0,
        }
    }
}
