//! Team and User Mutations
//!
//! The persistence writes the CRUD layer performs: user creation, team
//! creation with the leader forced into the member table, membership adds and
//! removals, and leadership transfer. The realtime layer itself never calls
//! these; they exist so lifecycle flows run against the real schema, with the
//! bridge invoked after these commits exactly as the CRUD layer does.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::backend::store::membership::TeamRole;

/// Create a user, returning its id
pub async fn create_user(pool: &SqlitePool, username: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (username, created_at)
        VALUES (?, ?)
        "#,
    )
    .bind(username)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Create a team and force its leader into the member table
pub async fn create_team(
    pool: &SqlitePool,
    name: &str,
    leader_id: i64,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO teams (name, leader_id)
        VALUES (?, ?)
        "#,
    )
    .bind(name)
    .bind(leader_id)
    .execute(&mut *tx)
    .await?;
    let team_id = result.last_insert_rowid();

    sqlx::query(
        r#"
        INSERT INTO team_members (team_id, user_id, role, joined_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(team_id)
    .bind(leader_id)
    .bind(TeamRole::Leader)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(team_id)
}

/// Add a user to a team as an ordinary member
pub async fn add_member(pool: &SqlitePool, team_id: i64, user_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO team_members (team_id, user_id, role, joined_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .bind(TeamRole::Member)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a user's membership row. Returns whether a row was deleted.
pub async fn remove_member(
    pool: &SqlitePool,
    team_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        DELETE FROM team_members
        WHERE team_id = ? AND user_id = ?
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Move leadership to another member, demoting the current leader.
///
/// Both role updates and the team row commit together, so the team never has
/// zero or two leaders.
pub async fn transfer_leadership(
    pool: &SqlitePool,
    team_id: i64,
    new_leader_id: i64,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        UPDATE team_members SET role = ?
        WHERE team_id = ? AND role = ?
        "#,
    )
    .bind(TeamRole::Member)
    .bind(team_id)
    .bind(TeamRole::Leader)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE team_members SET role = ?
        WHERE team_id = ? AND user_id = ?
        "#,
    )
    .bind(TeamRole::Leader)
    .bind(team_id)
    .bind(new_leader_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE teams SET leader_id = ?
        WHERE id = ?
        "#,
    )
    .bind(new_leader_id)
    .bind(team_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
