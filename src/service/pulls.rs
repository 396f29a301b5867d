//! Pull request lifecycle and single reviewer reassignment.

use crate::assignment::{select_reviewers, DEFAULT_REVIEWER_COUNT};
use crate::error::AppError;
use crate::models::PullRequest;
use crate::service::ReviewService;
use tracing::info;

impl ReviewService {
    /// Open a pull request and assign up to two reviewers from the
    /// author's team. A team with no eligible members yields a PR with an
    /// empty reviewer set, not an error.
    pub async fn create_pull_request(
        &self,
        pr_id: &str,
        pr_name: &str,
        author_id: &str,
    ) -> Result<PullRequest, AppError> {
        if self.review.pr_exists(pr_id).await? {
            return Err(AppError::PrExists(pr_id.to_string()));
        }

        let author = self
            .directory
            .user_by_id(author_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", author_id)))?;

        let candidates = self
            .directory
            .active_team_members(&author.team_name, &[author.user_id.clone()])
            .await?;

        let reviewers = {
            let mut rng = self.rng.lock().await;
            select_reviewers(&candidates, DEFAULT_REVIEWER_COUNT, &mut *rng)
        };

        self.review
            .create_pull_request(pr_id, pr_name, author_id, &reviewers)
            .await?;
        info!(
            "Created PR '{}' by '{}' with reviewers {:?}",
            pr_id, author_id, reviewers
        );

        self.fetch_pr(pr_id).await
    }

    /// Merge is terminal and idempotent; re-merging returns the current
    /// state without touching the merge timestamp.
    pub async fn merge_pull_request(&self, pr_id: &str) -> Result<PullRequest, AppError> {
        if self.review.pull_request_by_id(pr_id).await?.is_none() {
            return Err(AppError::NotFound(format!("PR '{}' not found", pr_id)));
        }

        self.review.set_merged(pr_id).await?;
        self.fetch_pr(pr_id).await
    }

    /// Replace one reviewer on an open pull request with a random active
    /// teammate of theirs, never the author and never the departing
    /// reviewer.
    pub async fn reassign_reviewer(
        &self,
        pr_id: &str,
        old_reviewer_id: &str,
    ) -> Result<(PullRequest, String), AppError> {
        let pr = self
            .review
            .pull_request_by_id(pr_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("PR '{}' not found", pr_id)))?;

        if pr.is_merged() {
            return Err(AppError::PrMerged(pr_id.to_string()));
        }

        if !pr.has_reviewer(old_reviewer_id) {
            return Err(AppError::NotAssigned(format!(
                "reviewer '{}' is not assigned to PR '{}'",
                old_reviewer_id, pr_id
            )));
        }

        let old_reviewer = self
            .directory
            .user_by_id(old_reviewer_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", old_reviewer_id)))?;

        let exclude = [old_reviewer.user_id.clone(), pr.author_id.clone()];
        let candidates = self
            .directory
            .active_team_members(&old_reviewer.team_name, &exclude)
            .await?;

        let new_reviewer_id = {
            let mut rng = self.rng.lock().await;
            select_reviewers(&candidates, 1, &mut *rng).pop()
        }
        .ok_or(AppError::NoCandidate)?;

        self.review
            .replace_reviewer(pr_id, old_reviewer_id, &new_reviewer_id)
            .await?;
        info!(
            "Reassigned PR '{}': '{}' -> '{}'",
            pr_id, old_reviewer_id, new_reviewer_id
        );

        let pr = self.fetch_pr(pr_id).await?;
        Ok((pr, new_reviewer_id))
    }

    async fn fetch_pr(&self, pr_id: &str) -> Result<PullRequest, AppError> {
        self.review
            .pull_request_by_id(pr_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("PR '{}' not found", pr_id)))
    }
}
