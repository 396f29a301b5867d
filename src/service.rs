//! Review service
//!
//! The operations exposed to the HTTP layer: team management, user
//! activation, the pull request lifecycle, reviewer reassignment, and
//! statistics. Each operation reads through the store interfaces, decides
//! via the assignment engine, and writes back; the random generator handle
//! is owned here and handed into each selection, never shared process-wide.

mod pulls;
mod stats;
mod teams;
mod users;

use crate::error::AppError;
use crate::store::{DirectoryStore, ReviewStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct ReviewService {
    directory: Arc<dyn DirectoryStore>,
    review: Arc<dyn ReviewStore>,
    rng: Mutex<StdRng>,
}

impl ReviewService {
    pub fn new(directory: Arc<dyn DirectoryStore>, review: Arc<dyn ReviewStore>) -> Self {
        Self {
            directory,
            review,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Service with deterministic selection, for tests and reproducible
    /// runs.
    pub fn with_seed(
        directory: Arc<dyn DirectoryStore>,
        review: Arc<dyn ReviewStore>,
        seed: u64,
    ) -> Self {
        Self {
            directory,
            review,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.directory.ping().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PrStatus, Team, TeamMember};
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;

    fn setup(seed: u64) -> (Arc<MemoryStore>, ReviewService) {
        let store = Arc::new(MemoryStore::new());
        let service = ReviewService::with_seed(store.clone(), store.clone(), seed);
        (store, service)
    }

    fn team(name: &str, members: &[(&str, bool)]) -> Team {
        Team {
            team_name: name.to_string(),
            members: members
                .iter()
                .map(|(id, active)| TeamMember {
                    user_id: id.to_string(),
                    username: format!("User {}", id),
                    is_active: *active,
                })
                .collect(),
        }
    }

    async fn seed_team(service: &ReviewService, name: &str, members: &[(&str, bool)]) {
        service
            .create_team(team(name, members))
            .await
            .expect("seed team");
    }

    // --- teams ---

    #[tokio::test]
    async fn create_team_rejects_duplicate_names() {
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true)]).await;

        let err = service.create_team(team("t1", &[])).await.unwrap_err();
        assert!(matches!(err, AppError::TeamExists(_)));
    }

    #[tokio::test]
    async fn get_team_lists_members_ordered_by_id() {
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a3", true), ("a1", true), ("a2", false)]).await;

        let fetched = service.get_team("t1").await.unwrap();
        let ids: Vec<&str> = fetched.members.iter().map(|m| m.user_id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "a3"]);
    }

    #[tokio::test]
    async fn get_team_unknown_is_not_found() {
        let (_, service) = setup(1);
        let err = service.get_team("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    // --- users ---

    #[tokio::test]
    async fn set_user_active_flips_the_flag() {
        let (store, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true)]).await;

        let user = service.set_user_active("a1", false).await.unwrap();
        assert!(!user.is_active);
        assert!(!store.user_by_id("a1").await.unwrap().unwrap().is_active);
    }

    #[tokio::test]
    async fn set_user_active_unknown_is_not_found() {
        let (_, service) = setup(1);
        let err = service.set_user_active("ghost", true).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn review_queue_lists_assigned_prs_by_id() {
        let (store, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true)]).await;
        store
            .create_pull_request("p2", "Second", "a1", &["a2".to_string()])
            .await
            .unwrap();
        store
            .create_pull_request("p1", "First", "a1", &["a2".to_string()])
            .await
            .unwrap();

        let queue = service.user_review_queue("a2").await.unwrap();
        let ids: Vec<&str> = queue.iter().map(|p| p.pull_request_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn review_queue_unknown_user_is_not_found() {
        let (_, service) = setup(1);
        let err = service.user_review_queue("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    // --- pull request lifecycle ---

    #[tokio::test]
    async fn create_assigns_both_teammates_when_only_two_are_eligible() {
        // end-to-end scenario: team t1 = {a1, a2, a3}, a1 authors
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true), ("a3", true)]).await;

        let pr = service
            .create_pull_request("p1", "Feature", "a1")
            .await
            .unwrap();

        assert_eq!(pr.status, PrStatus::Open);
        assert_eq!(pr.assigned_reviewers, vec!["a2", "a3"]);
    }

    #[tokio::test]
    async fn create_never_assigns_the_author_and_picks_exactly_two() {
        let (_, service) = setup(7);
        seed_team(
            &service,
            "t1",
            &[
                ("a1", true),
                ("a2", true),
                ("a3", true),
                ("a4", true),
                ("a5", true),
            ],
        )
        .await;

        let pr = service
            .create_pull_request("p1", "Feature", "a3")
            .await
            .unwrap();

        assert_eq!(pr.assigned_reviewers.len(), 2);
        assert!(!pr.has_reviewer("a3"));
        let distinct = pr.assigned_reviewers[0] != pr.assigned_reviewers[1];
        assert!(distinct);
    }

    #[tokio::test]
    async fn create_with_no_eligible_teammates_succeeds_without_reviewers() {
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", false)]).await;

        let pr = service
            .create_pull_request("p1", "Solo", "a1")
            .await
            .unwrap();
        assert!(pr.assigned_reviewers.is_empty());
    }

    #[tokio::test]
    async fn create_duplicate_pr_id_is_rejected() {
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true)]).await;
        service
            .create_pull_request("p1", "First", "a1")
            .await
            .unwrap();

        let err = service
            .create_pull_request("p1", "Again", "a1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::PrExists(_)));
    }

    #[tokio::test]
    async fn create_with_unknown_author_is_not_found() {
        let (_, service) = setup(1);
        let err = service
            .create_pull_request("p1", "Feature", "ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn merge_is_idempotent_and_keeps_the_first_timestamp() {
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true)]).await;
        service
            .create_pull_request("p1", "Feature", "a1")
            .await
            .unwrap();

        let first = service.merge_pull_request("p1").await.unwrap();
        assert_eq!(first.status, PrStatus::Merged);
        let merged_at = first.merged_at.expect("merge timestamp set");

        let second = service.merge_pull_request("p1").await.unwrap();
        assert_eq!(second.status, PrStatus::Merged);
        assert_eq!(second.merged_at, Some(merged_at));
    }

    #[tokio::test]
    async fn merge_unknown_pr_is_not_found() {
        let (_, service) = setup(1);
        let err = service.merge_pull_request("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    // --- single reassignment ---

    #[tokio::test]
    async fn reassign_replaces_with_the_only_eligible_teammate() {
        // end-to-end scenario: p1 reviewed by {a2, a3}; a4 is the only
        // eligible replacement once a3 goes inactive
        let (store, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true), ("a3", true)]).await;
        service
            .create_pull_request("p1", "Feature", "a1")
            .await
            .unwrap();

        // roster grows after the PR was opened
        store.create_team(&team("t1", &[("a4", true)])).await.unwrap();
        service.set_user_active("a3", false).await.unwrap();

        let (pr, new_reviewer) = service.reassign_reviewer("p1", "a2").await.unwrap();
        assert_eq!(new_reviewer, "a4");
        assert_eq!(pr.assigned_reviewers, vec!["a3", "a4"]);
    }

    #[tokio::test]
    async fn reassign_on_merged_pr_fails_and_changes_nothing() {
        let (store, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true), ("a3", true)]).await;
        service
            .create_pull_request("p1", "Feature", "a1")
            .await
            .unwrap();
        service.merge_pull_request("p1").await.unwrap();

        let err = service.reassign_reviewer("p1", "a2").await.unwrap_err();
        assert!(matches!(err, AppError::PrMerged(_)));

        let pr = store.pull_request_by_id("p1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["a2", "a3"]);
    }

    #[tokio::test]
    async fn reassign_requires_the_old_reviewer_to_be_assigned() {
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true), ("a3", true)]).await;
        service
            .create_pull_request("p1", "Feature", "a1")
            .await
            .unwrap();

        let err = service.reassign_reviewer("p1", "a1").await.unwrap_err();
        assert!(matches!(err, AppError::NotAssigned(_)));
    }

    #[tokio::test]
    async fn reassign_unknown_pr_is_not_found() {
        let (_, service) = setup(1);
        let err = service.reassign_reviewer("ghost", "a2").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn reassign_with_no_eligible_candidate_fails() {
        let (_, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true), ("a3", true)]).await;
        service
            .create_pull_request("p1", "Feature", "a1")
            .await
            .unwrap();
        service.set_user_active("a3", false).await.unwrap();

        let err = service.reassign_reviewer("p1", "a2").await.unwrap_err();
        assert!(matches!(err, AppError::NoCandidate));
    }

    // --- bulk deactivation ---

    #[tokio::test]
    async fn bulk_deactivate_falls_back_to_the_author_team() {
        // end-to-end scenario: a1 (team t0) authored p1, reviewed by all
        // of t1; t0 still has b1 active
        let (store, service) = setup(1);
        seed_team(&service, "t0", &[("a1", true), ("b1", true)]).await;
        seed_team(&service, "t1", &[("a2", true), ("a3", true)]).await;
        store
            .create_pull_request("p1", "Feature", "a1", &["a2".to_string(), "a3".to_string()])
            .await
            .unwrap();

        let result = service.bulk_deactivate("t1").await.unwrap();

        assert_eq!(result.deactivated_users, vec!["a2", "a3"]);
        assert_eq!(result.reassigned_prs, vec!["p1"]);
        assert_eq!(result.deactivated_count, 2);
        assert_eq!(result.reassigned_count, 1);

        // both links collapsed onto the only candidate anywhere
        let pr = store.pull_request_by_id("p1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["b1"]);
    }

    #[tokio::test]
    async fn bulk_deactivate_never_picks_a_batch_member() {
        let (store, service) = setup(3);
        seed_team(&service, "t2", &[("a1", true), ("c1", true)]).await;
        seed_team(&service, "t1", &[("a2", true), ("a3", true)]).await;
        store
            .create_pull_request("p1", "Feature", "a1", &["a2".to_string(), "a3".to_string()])
            .await
            .unwrap();

        service.bulk_deactivate("t1").await.unwrap();

        let pr = store.pull_request_by_id("p1").await.unwrap().unwrap();
        assert!(!pr.has_reviewer("a2"));
        assert!(!pr.has_reviewer("a3"));
        assert_eq!(pr.assigned_reviewers, vec!["c1"]);
    }

    #[tokio::test]
    async fn bulk_deactivate_leaves_a_gap_when_no_candidate_exists_anywhere() {
        let (store, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true)]).await;
        store
            .create_pull_request("p1", "Feature", "a1", &["a2".to_string()])
            .await
            .unwrap();

        let result = service.bulk_deactivate("t1").await.unwrap();

        assert_eq!(result.deactivated_users, vec!["a1", "a2"]);
        assert!(result.reassigned_prs.is_empty());

        // the link still points at the deactivated reviewer
        let pr = store.pull_request_by_id("p1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["a2"]);
    }

    #[tokio::test]
    async fn bulk_deactivate_is_idempotent() {
        let (store, service) = setup(1);
        seed_team(&service, "t0", &[("a1", true), ("b1", true)]).await;
        seed_team(&service, "t1", &[("a2", true)]).await;
        store
            .create_pull_request("p1", "Feature", "a1", &["a2".to_string()])
            .await
            .unwrap();

        let first = service.bulk_deactivate("t1").await.unwrap();
        assert_eq!(first.deactivated_count, 1);

        let second = service.bulk_deactivate("t1").await.unwrap();
        assert!(second.deactivated_users.is_empty());
        assert!(second.reassigned_prs.is_empty());
    }

    #[tokio::test]
    async fn bulk_deactivate_of_an_unknown_team_is_a_no_op() {
        let (_, service) = setup(1);
        let result = service.bulk_deactivate("ghost").await.unwrap();
        assert!(result.deactivated_users.is_empty());
        assert!(result.reassigned_prs.is_empty());
    }

    #[tokio::test]
    async fn bulk_deactivate_touches_every_affected_open_pr() {
        let (store, service) = setup(5);
        seed_team(&service, "t0", &[("a1", true), ("b1", true), ("b2", true)]).await;
        seed_team(&service, "t1", &[("a2", true)]).await;
        store
            .create_pull_request("p1", "First", "a1", &["a2".to_string()])
            .await
            .unwrap();
        store
            .create_pull_request("p2", "Second", "a1", &["a2".to_string()])
            .await
            .unwrap();

        let result = service.bulk_deactivate("t1").await.unwrap();
        assert_eq!(result.reassigned_prs, vec!["p1", "p2"]);

        for pr_id in ["p1", "p2"] {
            let pr = store.pull_request_by_id(pr_id).await.unwrap().unwrap();
            assert!(!pr.has_reviewer("a2"));
            assert_eq!(pr.assigned_reviewers.len(), 1);
        }
    }

    #[tokio::test]
    async fn bulk_deactivate_skips_merged_prs() {
        let (store, service) = setup(1);
        seed_team(&service, "t0", &[("a1", true), ("b1", true)]).await;
        seed_team(&service, "t1", &[("a2", true)]).await;
        store
            .create_pull_request("p1", "Feature", "a1", &["a2".to_string()])
            .await
            .unwrap();
        store.set_merged("p1").await.unwrap();

        let result = service.bulk_deactivate("t1").await.unwrap();
        assert_eq!(result.deactivated_users, vec!["a2"]);
        assert!(result.reassigned_prs.is_empty());

        let pr = store.pull_request_by_id("p1").await.unwrap().unwrap();
        assert_eq!(pr.assigned_reviewers, vec!["a2"]);
    }

    // --- stats ---

    #[tokio::test]
    async fn stats_order_by_load_then_id() {
        let (store, service) = setup(1);
        seed_team(&service, "t1", &[("a1", true), ("a2", true), ("a3", true)]).await;
        store
            .create_pull_request("p1", "First", "a1", &["a2".to_string(), "a3".to_string()])
            .await
            .unwrap();
        store
            .create_pull_request("p2", "Second", "a1", &["a3".to_string()])
            .await
            .unwrap();

        let stats = service.stats().await.unwrap();

        let users: Vec<(&str, i64)> = stats
            .users_stats
            .iter()
            .map(|u| (u.user_id.as_str(), u.assigned_prs_count))
            .collect();
        assert_eq!(users, vec![("a3", 2), ("a2", 1), ("a1", 0)]);

        let prs: Vec<(&str, i64)> = stats
            .prs_stats
            .iter()
            .map(|p| (p.pull_request_id.as_str(), p.reviewers_count))
            .collect();
        assert_eq!(prs, vec![("p1", 2), ("p2", 1)]);

        assert_eq!(stats.total_users, 3);
        assert_eq!(stats.total_prs, 2);
    }

    #[tokio::test]
    async fn health_check_reports_store_reachability() {
        let (_, service) = setup(1);
        assert!(service.health_check().await.is_ok());
    }
}
