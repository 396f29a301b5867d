//! PostgreSQL store
//!
//! Implements both store interfaces over a deadpool-postgres pool. Every
//! multi-statement write runs in one transaction, and reviewer-link
//! mutations take a `FOR UPDATE` row lock on the owning pull request so
//! concurrent reassignments of the same PR serialize instead of racing.

use crate::db::queries;
use crate::models::{PrStats, PrStatus, PullRequest, PullRequestShort, Team, TeamMember, User, UserStats};
use crate::store::{
    DirectoryStore, OpenPrSnapshot, ReassignmentPlan, ReviewStore, StoreError,
};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use std::collections::{BTreeMap, HashMap};
use tokio_postgres::Row;

/// PostgreSQL implementation of the directory and review stores.
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn status_from_row(row: &Row, idx: &str) -> Result<PrStatus, StoreError> {
    let raw: String = row.get(idx);
    raw.parse().map_err(StoreError::Corrupt)
}

#[async_trait]
impl DirectoryStore for PgStore {
    async fn user_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_opt(queries::GET_USER, &[&user_id]).await?;

        Ok(row.map(|r| User {
            user_id: r.get("user_id"),
            username: r.get("username"),
            team_name: r.get("team_name"),
            is_active: r.get("is_active"),
        }))
    }

    async fn active_team_members(
        &self,
        team_name: &str,
        exclude: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(queries::ACTIVE_TEAM_MEMBERS, &[&team_name, &exclude])
            .await?;

        Ok(rows.iter().map(|r| r.get("user_id")).collect())
    }

    async fn team_exists(&self, team_name: &str) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_one(queries::TEAM_EXISTS, &[&team_name]).await?;
        Ok(row.get(0))
    }

    async fn team_by_name(&self, team_name: &str) -> Result<Option<Team>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::TEAM_MEMBERS, &[&team_name]).await?;

        if rows.is_empty() {
            return Ok(None);
        }

        let members = rows
            .iter()
            .map(|r| TeamMember {
                user_id: r.get("user_id"),
                username: r.get("username"),
                is_active: r.get("is_active"),
            })
            .collect();

        Ok(Some(Team {
            team_name: team_name.to_string(),
            members,
        }))
    }

    async fn create_team(&self, team: &Team) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute(queries::UPSERT_TEAM, &[&team.team_name]).await?;

        for member in &team.members {
            tx.execute(
                queries::UPSERT_USER,
                &[
                    &member.user_id,
                    &member.username,
                    &team.team_name,
                    &member.is_active,
                ],
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn set_user_active(&self, user_id: &str, is_active: bool) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client
            .execute(queries::SET_USER_ACTIVE, &[&is_active, &user_id])
            .await?;
        Ok(())
    }

    async fn deactivate_team(&self, team_name: &str) -> Result<Vec<String>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::DEACTIVATE_TEAM, &[&team_name]).await?;

        let mut flipped: Vec<String> = rows.iter().map(|r| r.get("user_id")).collect();
        flipped.sort();
        Ok(flipped)
    }

    async fn team_names_for_users(
        &self,
        user_ids: &[String],
    ) -> Result<HashMap<String, String>, StoreError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let client = self.pool.get().await?;
        let rows = client
            .query(queries::TEAM_NAMES_FOR_USERS, &[&user_ids])
            .await?;

        Ok(rows
            .iter()
            .map(|r| (r.get("user_id"), r.get("team_name")))
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1 AS ok", &[]).await?;
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for PgStore {
    async fn pr_exists(&self, pr_id: &str) -> Result<bool, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_one(queries::PR_EXISTS, &[&pr_id]).await?;
        Ok(row.get(0))
    }

    async fn pull_request_by_id(&self, pr_id: &str) -> Result<Option<PullRequest>, StoreError> {
        let client = self.pool.get().await?;
        let row = match client.query_opt(queries::GET_PR, &[&pr_id]).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        let reviewers = client
            .query(queries::PR_REVIEWERS, &[&pr_id])
            .await?
            .iter()
            .map(|r| r.get("reviewer_id"))
            .collect();

        Ok(Some(PullRequest {
            pull_request_id: row.get("pull_request_id"),
            pull_request_name: row.get("pull_request_name"),
            author_id: row.get("author_id"),
            status: status_from_row(&row, "status")?,
            created_at: row.get("created_at"),
            merged_at: row.get("merged_at"),
            assigned_reviewers: reviewers,
        }))
    }

    async fn create_pull_request(
        &self,
        pr_id: &str,
        pr_name: &str,
        author_id: &str,
        reviewers: &[String],
    ) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.execute(queries::INSERT_PR, &[&pr_id, &pr_name, &author_id])
            .await?;

        for reviewer_id in reviewers {
            tx.execute(queries::INSERT_REVIEWER, &[&pr_id, reviewer_id])
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn set_merged(&self, pr_id: &str) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.execute(queries::MERGE_PR, &[&pr_id]).await?;
        Ok(())
    }

    async fn replace_reviewer(
        &self,
        pr_id: &str,
        old_id: &str,
        new_id: &str,
    ) -> Result<(), StoreError> {
        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        tx.query_opt(queries::LOCK_PR, &[&pr_id]).await?;
        tx.execute(queries::DELETE_REVIEWER, &[&pr_id, &old_id])
            .await?;
        tx.execute(queries::INSERT_REVIEWER, &[&pr_id, &new_id])
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn open_prs_referencing(
        &self,
        reviewer_ids: &[String],
    ) -> Result<BTreeMap<String, OpenPrSnapshot>, StoreError> {
        if reviewer_ids.is_empty() {
            return Ok(BTreeMap::new());
        }

        let client = self.pool.get().await?;
        let rows = client
            .query(queries::OPEN_PRS_REFERENCING, &[&reviewer_ids])
            .await?;

        let mut prs: BTreeMap<String, OpenPrSnapshot> = BTreeMap::new();
        for row in &rows {
            let pr_id: String = row.get("pull_request_id");
            let author_id: String = row.get("author_id");
            let reviewer_id: String = row.get("reviewer_id");

            prs.entry(pr_id)
                .or_insert_with(|| OpenPrSnapshot {
                    author_id,
                    reviewer_ids: Vec::new(),
                })
                .reviewer_ids
                .push(reviewer_id);
        }

        Ok(prs)
    }

    async fn apply_reassignment_plan(
        &self,
        plan: &ReassignmentPlan,
    ) -> Result<Vec<String>, StoreError> {
        if plan.is_empty() {
            return Ok(Vec::new());
        }

        let mut client = self.pool.get().await?;
        let tx = client.transaction().await?;

        let mut touched = Vec::with_capacity(plan.len());
        for (pr_id, replacements) in plan {
            tx.query_opt(queries::LOCK_PR, &[pr_id]).await?;

            for (old_id, new_id) in replacements {
                tx.execute(queries::DELETE_REVIEWER, &[pr_id, old_id])
                    .await?;
                tx.execute(queries::INSERT_REVIEWER, &[pr_id, new_id])
                    .await?;
            }
            touched.push(pr_id.clone());
        }

        tx.commit().await?;
        Ok(touched)
    }

    async fn prs_reviewed_by(&self, user_id: &str) -> Result<Vec<PullRequestShort>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::PRS_REVIEWED_BY, &[&user_id]).await?;

        rows.iter()
            .map(|r| {
                Ok(PullRequestShort {
                    pull_request_id: r.get("pull_request_id"),
                    pull_request_name: r.get("pull_request_name"),
                    author_id: r.get("author_id"),
                    status: status_from_row(r, "status")?,
                })
            })
            .collect()
    }

    async fn user_stats(&self) -> Result<Vec<UserStats>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::USER_STATS, &[]).await?;

        Ok(rows
            .iter()
            .map(|r| UserStats {
                user_id: r.get("user_id"),
                username: r.get("username"),
                assigned_prs_count: r.get("assigned_prs_count"),
            })
            .collect())
    }

    async fn pr_stats(&self) -> Result<Vec<PrStats>, StoreError> {
        let client = self.pool.get().await?;
        let rows = client.query(queries::PR_STATS, &[]).await?;

        rows.iter()
            .map(|r| {
                Ok(PrStats {
                    pull_request_id: r.get("pull_request_id"),
                    pull_request_name: r.get("pull_request_name"),
                    reviewers_count: r.get("reviewers_count"),
                    status: status_from_row(r, "status")?,
                })
            })
            .collect()
    }

    async fn total_users(&self) -> Result<i64, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_one(queries::COUNT_USERS, &[]).await?;
        Ok(row.get(0))
    }

    async fn total_prs(&self) -> Result<i64, StoreError> {
        let client = self.pool.get().await?;
        let row = client.query_one(queries::COUNT_PRS, &[]).await?;
        Ok(row.get(0))
    }
}
