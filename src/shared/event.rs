//! Socket Event Vocabulary
//!
//! Commands clients emit, events the server pushes back, and the lifecycle
//! events the CRUD layer feeds through the bridge. All three serialize to the
//! `{"event", "data"}` envelope; the event names are protocol and are kept
//! verbatim for compatibility with existing clients.

use serde::{Deserialize, Serialize};

use crate::shared::message::ChatMessage;

/// A command received from a connected client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientCommand {
    /// Enter a team room after a membership check
    #[serde(rename_all = "camelCase")]
    JoinTeam { team_id: i64 },

    /// Persist and fan out a chat message
    #[serde(rename_all = "camelCase")]
    SendMessage { team_id: i64, content: String },

    /// Request a snapshot of recent messages, replied to privately
    #[serde(rename_all = "camelCase")]
    LoadHistory {
        team_id: i64,
        #[serde(default)]
        limit: Option<i64>,
    },
}

/// An event pushed to a connected client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Acknowledges a successful room join
    #[serde(rename_all = "camelCase")]
    JoinedTeam { team_id: i64 },

    /// A new message in a joined team room
    NewMessage(ChatMessage),

    /// Snapshot reply to a history request
    #[serde(rename_all = "camelCase")]
    History {
        team_id: i64,
        messages: Vec<ChatMessage>,
    },

    /// A rejected action, scoped to the requesting connection only
    #[serde(rename_all = "camelCase")]
    Error { message: String },

    /// The user's join request was accepted
    #[serde(rename_all = "camelCase")]
    JoinAccepted { team_id: i64 },

    /// A member was removed from the team by its leader
    #[serde(rename_all = "camelCase")]
    MemberKicked { team_id: i64, user_id: i64 },

    /// Generic hint that team state changed and should be refetched
    #[serde(rename_all = "camelCase")]
    TeamUpdated { team_id: i64 },

    /// Team leadership moved to another member
    #[serde(rename_all = "camelCase")]
    LeaderChanged { team_id: i64, new_leader_id: i64 },

    /// A member left the team voluntarily
    #[serde(rename_all = "camelCase")]
    MemberLeft { team_id: i64, user_id: i64 },
}

/// A team-lifecycle notification handed to the bridge by the CRUD layer
/// after its own transaction commits
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    JoinAccepted { team_id: i64 },
    MemberKicked { team_id: i64, user_id: i64 },
    TeamUpdated { team_id: i64 },
    LeaderChanged { team_id: i64, new_leader_id: i64 },
    MemberLeft { team_id: i64, user_id: i64 },
}

impl LifecycleEvent {
    /// Wire name of the event, as clients subscribe to it
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinAccepted { .. } => "joinAccepted",
            Self::MemberKicked { .. } => "memberKicked",
            Self::TeamUpdated { .. } => "teamUpdated",
            Self::LeaderChanged { .. } => "leaderChanged",
            Self::MemberLeft { .. } => "memberLeft",
        }
    }
}

impl From<LifecycleEvent> for ServerEvent {
    fn from(event: LifecycleEvent) -> Self {
        match event {
            LifecycleEvent::JoinAccepted { team_id } => ServerEvent::JoinAccepted { team_id },
            LifecycleEvent::MemberKicked { team_id, user_id } => {
                ServerEvent::MemberKicked { team_id, user_id }
            }
            LifecycleEvent::TeamUpdated { team_id } => ServerEvent::TeamUpdated { team_id },
            LifecycleEvent::LeaderChanged {
                team_id,
                new_leader_id,
            } => ServerEvent::LeaderChanged {
                team_id,
                new_leader_id,
            },
            LifecycleEvent::MemberLeft { team_id, user_id } => {
                ServerEvent::MemberLeft { team_id, user_id }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_join_team_command() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"joinTeam","data":{"teamId":42}}"#).unwrap();
        assert_eq!(cmd, ClientCommand::JoinTeam { team_id: 42 });
    }

    #[test]
    fn parses_send_message_command() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"sendMessage","data":{"teamId":42,"content":"gg"}}"#)
                .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::SendMessage {
                team_id: 42,
                content: "gg".to_string()
            }
        );
    }

    #[test]
    fn history_limit_is_optional() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"loadHistory","data":{"teamId":7}}"#).unwrap();
        assert_eq!(
            cmd,
            ClientCommand::LoadHistory {
                team_id: 7,
                limit: None
            }
        );

        let cmd: ClientCommand =
            serde_json::from_str(r#"{"event":"loadHistory","data":{"teamId":7,"limit":20}}"#)
                .unwrap();
        assert_eq!(
            cmd,
            ClientCommand::LoadHistory {
                team_id: 7,
                limit: Some(20)
            }
        );
    }

    #[test]
    fn server_events_keep_wire_names() {
        let event = ServerEvent::MemberKicked {
            team_id: 42,
            user_id: 9,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"event":"memberKicked","data":{"teamId":42,"userId":9}})
        );

        let event = ServerEvent::LeaderChanged {
            team_id: 3,
            new_leader_id: 5,
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"event":"leaderChanged","data":{"teamId":3,"newLeaderId":5}})
        );
    }

    #[test]
    fn error_event_carries_message_only() {
        let event = ServerEvent::Error {
            message: "Not a member of this team".to_string(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"event":"error","data":{"message":"Not a member of this team"}})
        );
    }

    #[test]
    fn lifecycle_events_convert_to_server_events() {
        let event = LifecycleEvent::JoinAccepted { team_id: 11 };
        assert_eq!(event.name(), "joinAccepted");
        assert_eq!(
            ServerEvent::from(event),
            ServerEvent::JoinAccepted { team_id: 11 }
        );

        let event = LifecycleEvent::MemberKicked {
            team_id: 4,
            user_id: 2,
        };
        assert_eq!(event.name(), "memberKicked");
        assert_eq!(
            ServerEvent::from(event),
            ServerEvent::MemberKicked {
                team_id: 4,
                user_id: 2
            }
        );
    }
}
