//! Aggregate statistics over users and pull requests.

use crate::error::AppError;
use crate::models::StatsResponse;
use crate::service::ReviewService;

impl ReviewService {
    pub async fn stats(&self) -> Result<StatsResponse, AppError> {
        let users_stats = self.review.user_stats().await?;
        let prs_stats = self.review.pr_stats().await?;
        let total_users = self.review.total_users().await?;
        let total_prs = self.review.total_prs().await?;

        Ok(StatsResponse {
            users_stats,
            prs_stats,
            total_users,
            total_prs,
        })
    }
}
