//! Storage abstraction
//!
//! The service consumes two narrow store interfaces: the directory store
//! (teams and users) and the review store (pull requests and reviewer
//! links). The PostgreSQL implementation backs both in production; the
//! in-memory implementation backs tests and local experiments.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::models::{PrStats, PullRequest, PullRequestShort, Team, User, UserStats};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Errors surfaced by either store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// The author and complete reviewer-link set of one open pull request,
/// captured at planning time.
#[derive(Debug, Clone)]
pub struct OpenPrSnapshot {
    pub author_id: String,
    pub reviewer_ids: Vec<String>,
}

/// Precomputed old -> new reviewer replacements per pull request, applied
/// as one atomic batch. Ordered maps keep batch application deterministic.
pub type ReassignmentPlan = BTreeMap<String, BTreeMap<String, String>>;

/// Teams and users (membership, active flag).
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Active members of a team, minus `exclude`, ordered by user id.
    async fn active_team_members(
        &self,
        team_name: &str,
        exclude: &[String],
    ) -> Result<Vec<String>, StoreError>;

    async fn team_exists(&self, team_name: &str) -> Result<bool, StoreError>;

    /// A team with its roster ordered by user id; `None` when the team has
    /// no members.
    async fn team_by_name(&self, team_name: &str) -> Result<Option<Team>, StoreError>;

    /// Create the team row and upsert every member, atomically.
    async fn create_team(&self, team: &Team) -> Result<(), StoreError>;

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<(), StoreError>;

    /// Atomically flip every active member of the team inactive; returns
    /// the ids actually flipped, ordered. Idempotent: an already-inactive
    /// team yields an empty set.
    async fn deactivate_team(&self, team_name: &str) -> Result<Vec<String>, StoreError>;

    /// Current team affiliation per user id; unknown ids are omitted.
    async fn team_names_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, String>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Pull requests and reviewer links.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    async fn pr_exists(&self, pr_id: &str) -> Result<bool, StoreError>;

    /// A pull request with its reviewer links ordered by reviewer id.
    async fn pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, StoreError>;

    /// Persist a new OPEN pull request and its initial reviewer links in
    /// one transaction.
    async fn create_pull_request(
        &self,
        pr_id: &str,
        pr_name: &str,
        author_id: &str,
        reviewers: &[String],
    ) -> Result<(), StoreError>;

    /// Mark merged; first-write-wins on the merge timestamp.
    async fn set_merged(&self, pr_id: &str) -> Result<(), StoreError>;

    /// Atomic delete+insert of one reviewer link.
    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_id: &str,
        new_id: &str,
    ) -> Result<(), StoreError>;

    /// Every OPEN pull request holding at least one link to the given
    /// reviewers, with its author and full link set, keyed by PR id.
    async fn open_prs_referencing(
        &self,
        reviewer_ids: &[String],
    ) -> Result<BTreeMap<String, OpenPrSnapshot>, StoreError>;

    /// Apply a reassignment plan as one atomic batch; returns the touched
    /// PR ids, ordered.
    async fn apply_reassignment_plan(
        &self,
        plan: &ReassignmentPlan,
    ) -> Result<Vec<String>, StoreError>;

    /// Pull requests the user currently reviews, ordered by PR id.
    async fn prs_reviewed_by(&self, user_id: &str) -> Result<Vec<PullRequestShort>, StoreError>;

    async fn user_stats(&self) -> Result<Vec<UserStats>, StoreError>;

    async fn pr_stats(&self) -> Result<Vec<PrStats>, StoreError>;

    async fn total_users(&self) -> Result<i64, StoreError>;

    async fn total_prs(&self) -> Result<i64, StoreError>;
}
