//! Chat Message Store
//!
//! Append and ordered replay of team chat messages. Messages are immutable
//! once written; ordering is by creation time with the row id breaking ties,
//! so concurrent sends in one team are observed in commit order.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::backend::error::ChatError;
use crate::shared::ChatMessage;

/// History size when the client does not ask for one (or asks for a
/// non-positive one)
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

/// Upper bound on a single history snapshot
pub const MAX_HISTORY_LIMIT: i64 = 200;

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    team_id: i64,
    sender_id: i64,
    sender_name: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            id: row.id,
            team_id: row.team_id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Append a message to a team's history
///
/// Trims the content first; rejects text that is empty after trimming.
/// Returns the stored record with the sender's display name resolved.
pub async fn insert_message(
    pool: &SqlitePool,
    team_id: i64,
    sender_id: i64,
    content: &str,
) -> Result<ChatMessage, ChatError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ChatError::InvalidContent);
    }

    let created_at = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO messages (team_id, sender_id, content, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(team_id)
    .bind(sender_id)
    .bind(content)
    .bind(created_at)
    .execute(pool)
    .await?;

    let row = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.team_id, m.sender_id, u.username AS sender_name,
               m.content, m.created_at
        FROM messages m
        JOIN users u ON u.id = m.sender_id
        WHERE m.id = ?
        "#,
    )
    .bind(result.last_insert_rowid())
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Load the most recent messages for a team, oldest first
///
/// Returns up to `limit` messages (default 50, capped at 200) in ascending
/// chronological order. A snapshot read: two calls with no intervening
/// writes return identical results.
pub async fn list_messages(
    pool: &SqlitePool,
    team_id: i64,
    limit: Option<i64>,
) -> Result<Vec<ChatMessage>, ChatError> {
    let limit = match limit {
        Some(n) if n > 0 => n.min(MAX_HISTORY_LIMIT),
        _ => DEFAULT_HISTORY_LIMIT,
    };

    let mut rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT m.id, m.team_id, m.sender_id, u.username AS sender_name,
               m.content, m.created_at
        FROM messages m
        JOIN users u ON u.id = m.sender_id
        WHERE m.team_id = ?
        ORDER BY m.created_at DESC, m.id DESC
        LIMIT ?
        "#,
    )
    .bind(team_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.reverse();
    Ok(rows.into_iter().map(ChatMessage::from).collect())
}
