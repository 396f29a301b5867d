//! User operations: activation flag and review queue lookup.

use crate::error::AppError;
use crate::models::{PullRequestShort, User};
use crate::service::ReviewService;
use tracing::info;

impl ReviewService {
    pub async fn set_user_active(
        &self,
        user_id: &str,
        is_active: bool,
    ) -> Result<User, AppError> {
        let mut user = self
            .directory
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{}' not found", user_id)))?;

        self.directory.set_user_active(user_id, is_active).await?;
        info!("User '{}' set is_active={}", user_id, is_active);

        user.is_active = is_active;
        Ok(user)
    }

    /// The pull requests a user currently reviews, ordered by PR id.
    pub async fn user_review_queue(
        &self,
        user_id: &str,
    ) -> Result<Vec<PullRequestShort>, AppError> {
        if self.directory.user_by_id(user_id).await?.is_none() {
            return Err(AppError::NotFound(format!("user '{}' not found", user_id)));
        }

        Ok(self.review.prs_reviewed_by(user_id).await?)
    }
}
