//! In-memory store
//!
//! Implements both store interfaces with ordered maps behind a single
//! `RwLock`, so every operation observes and produces a consistent state.
//! Used as the test double for the service and the assignment engine; all
//! state is lost on drop.

use crate::models::{
    PrStats, PrStatus, PullRequest, PullRequestShort, Team, TeamMember, User, UserStats,
};
use crate::store::{
    DirectoryStore, OpenPrSnapshot, ReassignmentPlan, ReviewStore, StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct PrRecord {
    name: String,
    author_id: String,
    status: PrStatus,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
    reviewers: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    teams: BTreeSet<String>,
    users: BTreeMap<String, User>,
    prs: BTreeMap<String, PrRecord>,
}

/// In-memory implementation of the directory and review stores.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn pr_to_model(pr_id: &str, record: &PrRecord) -> PullRequest {
    PullRequest {
        pull_request_id: pr_id.to_string(),
        pull_request_name: record.name.clone(),
        author_id: record.author_id.clone(),
        status: record.status,
        created_at: Some(record.created_at),
        merged_at: record.merged_at,
        assigned_reviewers: record.reviewers.iter().cloned().collect(),
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(user_id).cloned())
    }

    async fn active_team_members(
        &self,
        team_name: &str,
        exclude: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .filter(|u| {
                u.team_name == team_name
                    && u.is_active
                    && !exclude.iter().any(|e| e == &u.user_id)
            })
            .map(|u| u.user_id.clone())
            .collect())
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.teams.contains(team_name))
    }

    async fn team_by_name(&self, team_name: &str) -> Result<Option<Team>, StoreError> {
        let inner = self.inner.read().await;
        let members: Vec<TeamMember> = inner
            .users
            .values()
            .filter(|u| u.team_name == team_name)
            .map(|u| TeamMember {
                user_id: u.user_id.clone(),
                username: u.username.clone(),
                is_active: u.is_active,
            })
            .collect();

        if members.is_empty() {
            return Ok(None);
        }

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }

    async fn create_team(&self, team: &Team) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.teams.insert(team.team_name.clone());

        for member in &team.members {
            inner.users.insert(
                member.user_id.clone(),
                User {
                    user_id: member.user_id.clone(),
                    username: member.username.clone(),
                    team_name: team.team_name.clone(),
                    is_active: member.is_active,
                },
            );
        }
        Ok(())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(user_id) {
            user.is_active = is_active;
        }
        Ok(())
    }

    async fn deactivate_team(&self, team_name: &str) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.write().await;
        let mut flipped = Vec::new();

        for user in inner.users.values_mut() {
            if user.team_name == team_name && user.is_active {
                user.is_active = false;
                flipped.push(user.user_id.clone());
            }
        }
        // users map is ordered by id, so flipped already is too
        Ok(flipped)
    }

    async fn team_names_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| {
                inner
                    .users
                    .get(id)
                    .map(|u| (id.clone(), u.team_name.clone()))
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn pr_exists(&self, pr_id: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.prs.contains_key(pr_id))
    }

    async fn pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.prs.get(pr_id).map(|r| pr_to_model(pr_id, r)))
    }

    async fn create_pull_request(
        &self,
        pr_id: &str,
        pr_name: &str,
        author_id: &str,
        reviewers: &[String],
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.prs.contains_key(pr_id) {
            return Err(StoreError::Conflict(format!(
                "pull request '{}' already exists",
                pr_id
            )));
        }

        inner.prs.insert(
            pr_id.to_string(),
            PrRecord {
                name: pr_name.to_string(),
                author_id: author_id.to_string(),
                status: PrStatus::Open,
                created_at: Utc::now(),
                merged_at: None,
                reviewers: reviewers.iter().cloned().collect(),
            },
        );
        Ok(())
    }

    async fn set_merged(&self, pr_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.prs.get_mut(pr_id) {
            record.status = PrStatus::Merged;
            if record.merged_at.is_none() {
                record.merged_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_id: &str,
        new_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(record) = inner.prs.get_mut(pr_id) {
            record.reviewers.remove(old_id);
            record.reviewers.insert(new_id.to_string());
        }
        Ok(())
    }

    async fn open_prs_referencing(
        &self,
        reviewer_ids: &[String],
    ) -> Result<BTreeMap<String, OpenPrSnapshot>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .prs
            .iter()
            .filter(|(_, r)| {
                r.status == PrStatus::Open
                    && reviewer_ids.iter().any(|id| r.reviewers.contains(id))
            })
            .map(|(pr_id, r)| {
                (
                    pr_id.clone(),
                    OpenPrSnapshot {
                        author_id: r.author_id.clone(),
                        reviewer_ids: r.reviewers.iter().cloned().collect(),
                    },
                )
            })
            .collect())
    }

    async fn apply_reassignment_plan(
        &self,
        plan: &ReassignmentPlan,
    ) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.write().await;
        let mut touched = Vec::with_capacity(plan.len());

        for (pr_id, replacements) in plan {
            if let Some(record) = inner.prs.get_mut(pr_id) {
                for (old_id, new_id) in replacements {
                    record.reviewers.remove(old_id);
                    // set semantics collapse two links landing on one replacement
                    record.reviewers.insert(new_id.clone());
                }
                touched.push(pr_id.clone());
            }
        }
        Ok(touched)
    }

    async fn prs_reviewed_by(&self, user_id: &str) -> Result<Vec<PullRequestShort>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .prs
            .iter()
            .filter(|(_, r)| r.reviewers.contains(user_id))
            .map(|(pr_id, r)| PullRequestShort {
                pull_request_id: pr_id.clone(),
                pull_request_name: r.name.clone(),
                author_id: r.author_id.clone(),
                status: r.status,
            })
            .collect())
    }

    async fn user_stats(&self) -> Result<Vec<UserStats>, StoreError> {
        let inner = self.inner.read().await;
        let mut stats: Vec<UserStats> = inner
            .users
            .values()
            .map(|u| {
                let count = inner
                    .prs
                    .values()
                    .filter(|r| r.reviewers.contains(&u.user_id))
                    .count() as i64;
                UserStats {
                    user_id: u.user_id.clone(),
                    username: u.username.clone(),
                    assigned_prs_count: count,
                }
            })
            .collect();

        stats.sort_by(|a, b| {
            b.assigned_prs_count
                .cmp(&a.assigned_prs_count)
                .then_with(|| a.user_id.cmp(&b.user_id))
        });
        Ok(stats)
    }

    async fn pr_stats(&self) -> Result<Vec<PrStats>, StoreError> {
        let inner = self.inner.read().await;
        let mut stats: Vec<PrStats> = inner
            .prs
            .iter()
            .map(|(pr_id, r)| PrStats {
                pull_request_id: pr_id.clone(),
                pull_request_name: r.name.clone(),
                reviewers_count: r.reviewers.len() as i64,
                status: r.status,
            })
            .collect();

        stats.sort_by(|a, b| {
            b.reviewers_count
                .cmp(&a.reviewers_count)
                .then_with(|| a.pull_request_id.cmp(&b.pull_request_id))
        });
        Ok(stats)
    }

    async fn total_users(&self) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.len() as i64)
    }

    async fn total_prs(&self) -> Result<i64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.prs.len() as i64)
    }
}
