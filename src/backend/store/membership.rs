//! Team Membership Lookups
//!
//! The authorization read path. Membership is mutated by the CRUD layer under
//! its own transactions and can change while a socket is mid-session, so
//! callers query fresh before every room-scoped action instead of caching.
//! Absence of a team or a membership row is an ordinary `false`, not an
//! error.

use sqlx::SqlitePool;

/// Role within a team. A team has exactly one LEADER at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
pub enum TeamRole {
    Leader,
    Member,
}

/// A membership row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TeamMembership {
    pub team_id: i64,
    pub user_id: i64,
    pub role: TeamRole,
}

/// Look up a membership row
pub async fn find_membership(
    pool: &SqlitePool,
    team_id: i64,
    user_id: i64,
) -> Result<Option<TeamMembership>, sqlx::Error> {
    sqlx::query_as::<_, TeamMembership>(
        r#"
        SELECT team_id, user_id, role
        FROM team_members
        WHERE team_id = ? AND user_id = ?
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Check whether a user currently belongs to a team
pub async fn is_member(pool: &SqlitePool, team_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    Ok(find_membership(pool, team_id, user_id).await?.is_some())
}
