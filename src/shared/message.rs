//! Chat Message Wire Type
//!
//! The message record as clients see it: the stored row plus the sender's
//! resolved display name. Messages are immutable once created and ordered by
//! creation time, insertion order breaking ties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted team chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message id assigned by the store
    pub id: i64,
    /// Team room the message belongs to
    pub team_id: i64,
    /// User id of the sender
    pub sender_id: i64,
    /// Sender display name, resolved at read time
    pub sender_name: String,
    /// Message text, trimmed, never empty
    pub content: String,
    /// Creation timestamp assigned by the store
    pub created_at: DateTime<Utc>,
}
