//! Team operations: creation, lookup, and bulk deactivation.

use crate::assignment::{plan_reassignments, PlanInput};
use crate::error::AppError;
use crate::models::{BulkDeactivateResponse, Team};
use crate::service::ReviewService;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

impl ReviewService {
    pub async fn create_team(&self, team: Team) -> Result<Team, AppError> {
        if self.directory.team_exists(&team.team_name).await? {
            return Err(AppError::TeamExists(team.team_name));
        }

        self.directory.create_team(&team).await?;
        info!(
            "Created team '{}' with {} members",
            team.team_name,
            team.members.len()
        );
        Ok(team)
    }

    pub async fn get_team(&self, team_name: &str) -> Result<Team, AppError> {
        self.directory
            .team_by_name(team_name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("team '{}' not found", team_name)))
    }

    /// Deactivate every active member of a team and replace the reviewer
    /// slots they held on open pull requests.
    ///
    /// Compute-then-apply: the flip happens first and atomically, the full
    /// replacement plan is computed against a snapshot, then applied as one
    /// batch. Links with no eligible candidate anywhere stay in place and
    /// are only visible through the returned counts.
    pub async fn bulk_deactivate(
        &self,
        team_name: &str,
    ) -> Result<BulkDeactivateResponse, AppError> {
        let deactivated = self.directory.deactivate_team(team_name).await?;
        if deactivated.is_empty() {
            info!(
                "Bulk deactivate of '{}': no active members to flip",
                team_name
            );
            return Ok(BulkDeactivateResponse::empty(team_name));
        }

        let open_prs = self.review.open_prs_referencing(&deactivated).await?;

        // team affiliation is re-read here, not assumed from the request:
        // the departing reviewers and the affected authors decide which
        // candidate pools the planner may draw from
        let mut involved: Vec<String> = deactivated.clone();
        involved.extend(open_prs.values().map(|pr| pr.author_id.clone()));
        involved.sort();
        involved.dedup();

        let team_of = self.directory.team_names_for_users(&involved).await?;

        let team_names: BTreeSet<String> = team_of.values().cloned().collect();
        let mut members_of = HashMap::new();
        for name in team_names {
            let members = self.directory.active_team_members(&name, &[]).await?;
            members_of.insert(name, members);
        }

        let input = PlanInput {
            deactivated: deactivated.iter().cloned().collect(),
            open_prs,
            team_of,
            members_of,
        };

        let outcome = {
            let mut rng = self.rng.lock().await;
            plan_reassignments(&input, &mut *rng)
        };

        for gap in &outcome.gaps {
            warn!(
                "No replacement for reviewer '{}' on PR '{}'; link left in place",
                gap.reviewer_id, gap.pr_id
            );
        }

        let reassigned = self.review.apply_reassignment_plan(&outcome.plan).await?;

        info!(
            "Bulk deactivate of '{}': {} users flipped, {} PRs reassigned",
            team_name,
            deactivated.len(),
            reassigned.len()
        );

        Ok(BulkDeactivateResponse {
            team_name: team_name.to_string(),
            deactivated_count: deactivated.len(),
            reassigned_count: reassigned.len(),
            deactivated_users: deactivated,
            reassigned_prs: reassigned,
        })
    }
}
