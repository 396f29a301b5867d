//! SQL query constants
//!
//! Contains all SQL used by the PostgreSQL store, including the startup
//! schema. Reviewer links live in `pr_reviewers` with a composite primary
//! key, which is what enforces link uniqueness under concurrent writers.

/// Startup schema, applied statement by statement.
pub const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS teams (
        team_name VARCHAR(255) PRIMARY KEY
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id VARCHAR(255) PRIMARY KEY,
        username VARCHAR(255) NOT NULL,
        team_name VARCHAR(255) NOT NULL REFERENCES teams(team_name) ON DELETE CASCADE,
        is_active BOOLEAN NOT NULL DEFAULT true
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pull_requests (
        pull_request_id VARCHAR(255) PRIMARY KEY,
        pull_request_name VARCHAR(255) NOT NULL,
        author_id VARCHAR(255) NOT NULL REFERENCES users(user_id),
        status VARCHAR(20) NOT NULL DEFAULT 'OPEN',
        created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
        merged_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pr_reviewers (
        pull_request_id VARCHAR(255) NOT NULL REFERENCES pull_requests(pull_request_id) ON DELETE CASCADE,
        reviewer_id VARCHAR(255) NOT NULL REFERENCES users(user_id),
        PRIMARY KEY (pull_request_id, reviewer_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_users_team ON users(team_name)",
    "CREATE INDEX IF NOT EXISTS idx_pr_reviewers ON pr_reviewers(pull_request_id)",
    "CREATE INDEX IF NOT EXISTS idx_pr_reviewers_user ON pr_reviewers(reviewer_id)",
];

// --- directory ---

pub const GET_USER: &str = r#"
    SELECT user_id, username, team_name, is_active
    FROM users
    WHERE user_id = $1
"#;

pub const SET_USER_ACTIVE: &str = "UPDATE users SET is_active = $1 WHERE user_id = $2";

/// Active members of a team minus an arbitrary exclusion list.
pub const ACTIVE_TEAM_MEMBERS: &str = r#"
    SELECT user_id
    FROM users
    WHERE team_name = $1 AND is_active = true AND user_id <> ALL($2)
    ORDER BY user_id
"#;

pub const TEAM_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM teams WHERE team_name = $1)";

pub const TEAM_MEMBERS: &str = r#"
    SELECT user_id, username, is_active
    FROM users
    WHERE team_name = $1
    ORDER BY user_id
"#;

pub const UPSERT_TEAM: &str = "INSERT INTO teams (team_name) VALUES ($1) ON CONFLICT DO NOTHING";

pub const UPSERT_USER: &str = r#"
    INSERT INTO users (user_id, username, team_name, is_active)
    VALUES ($1, $2, $3, $4)
    ON CONFLICT (user_id)
    DO UPDATE SET username = $2, team_name = $3, is_active = $4
"#;

/// Flip every active member of a team inactive; reports who was flipped.
pub const DEACTIVATE_TEAM: &str = r#"
    UPDATE users
    SET is_active = false
    WHERE team_name = $1 AND is_active = true
    RETURNING user_id
"#;

pub const TEAM_NAMES_FOR_USERS: &str = r#"
    SELECT user_id, team_name
    FROM users
    WHERE user_id = ANY($1)
"#;

// --- review ---

pub const PR_EXISTS: &str =
    "SELECT EXISTS(SELECT 1 FROM pull_requests WHERE pull_request_id = $1)";

pub const GET_PR: &str = r#"
    SELECT pull_request_id, pull_request_name, author_id, status, created_at, merged_at
    FROM pull_requests
    WHERE pull_request_id = $1
"#;

pub const PR_REVIEWERS: &str = r#"
    SELECT reviewer_id
    FROM pr_reviewers
    WHERE pull_request_id = $1
    ORDER BY reviewer_id
"#;

pub const INSERT_PR: &str = r#"
    INSERT INTO pull_requests (pull_request_id, pull_request_name, author_id, status)
    VALUES ($1, $2, $3, 'OPEN')
"#;

pub const INSERT_REVIEWER: &str = r#"
    INSERT INTO pr_reviewers (pull_request_id, reviewer_id)
    VALUES ($1, $2)
    ON CONFLICT DO NOTHING
"#;

pub const DELETE_REVIEWER: &str = r#"
    DELETE FROM pr_reviewers
    WHERE pull_request_id = $1 AND reviewer_id = $2
"#;

/// First-write-wins on the merge timestamp; re-merging is a no-op.
pub const MERGE_PR: &str = r#"
    UPDATE pull_requests
    SET status = 'MERGED', merged_at = COALESCE(merged_at, CURRENT_TIMESTAMP)
    WHERE pull_request_id = $1
"#;

/// Row lock taken before mutating a PR's reviewer links.
pub const LOCK_PR: &str =
    "SELECT pull_request_id FROM pull_requests WHERE pull_request_id = $1 FOR UPDATE";

/// Every link of every OPEN pull request that references at least one of
/// the given reviewers. The full link set per PR is needed to plan
/// replacements, not just the affected links.
pub const OPEN_PRS_REFERENCING: &str = r#"
    SELECT pr.pull_request_id, pr.author_id, prr.reviewer_id
    FROM pull_requests pr
    INNER JOIN pr_reviewers prr ON prr.pull_request_id = pr.pull_request_id
    WHERE pr.status = 'OPEN'
      AND pr.pull_request_id IN (
          SELECT pull_request_id FROM pr_reviewers WHERE reviewer_id = ANY($1)
      )
    ORDER BY pr.pull_request_id, prr.reviewer_id
"#;

pub const PRS_REVIEWED_BY: &str = r#"
    SELECT pr.pull_request_id, pr.pull_request_name, pr.author_id, pr.status
    FROM pull_requests pr
    INNER JOIN pr_reviewers prr ON pr.pull_request_id = prr.pull_request_id
    WHERE prr.reviewer_id = $1
    ORDER BY pr.pull_request_id
"#;

// --- stats ---

pub const USER_STATS: &str = r#"
    SELECT
        u.user_id,
        u.username,
        COALESCE(COUNT(prr.reviewer_id), 0) AS assigned_prs_count
    FROM users u
    LEFT JOIN pr_reviewers prr ON u.user_id = prr.reviewer_id
    GROUP BY u.user_id, u.username
    ORDER BY assigned_prs_count DESC, u.user_id
"#;

pub const PR_STATS: &str = r#"
    SELECT
        pr.pull_request_id,
        pr.pull_request_name,
        COALESCE(COUNT(prr.reviewer_id), 0) AS reviewers_count,
        pr.status
    FROM pull_requests pr
    LEFT JOIN pr_reviewers prr ON pr.pull_request_id = prr.pull_request_id
    GROUP BY pr.pull_request_id, pr.pull_request_name, pr.status
    ORDER BY reviewers_count DESC, pr.pull_request_id
"#;

pub const COUNT_USERS: &str = "SELECT COUNT(*) FROM users";

pub const COUNT_PRS: &str = "SELECT COUNT(*) FROM pull_requests";
