//! Chat Session Protocol
//!
//! The per-connection state machine: authenticate at the handshake, join the
//! personal room, then process commands until the transport closes. Every
//! room-scoped action re-checks membership against the store at the time of
//! the call; the live subscription set is never treated as an authorization
//! source, because the CRUD layer can revoke membership while a socket is
//! mid-session and the eviction push may not have landed yet.
//!
//! Recoverable failures (bad team id, blank content, not a member) are
//! reported to the requesting connection as an `error` event and the
//! connection stays open. Only the handshake can reject a connection.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::backend::auth::sessions::verify_identity;
use crate::backend::auth::Identity;
use crate::backend::error::ChatError;
use crate::backend::rooms::{ConnectionId, RoomId, RoomRegistry};
use crate::backend::server::state::AppState;
use crate::backend::store::{membership, messages};
use crate::shared::{ClientCommand, ServerEvent};

/// Connect-time query parameters
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Bearer credential; browser WebSocket clients cannot set headers
    token: Option<String>,
}

/// Handle `GET /team-chat`
///
/// Authenticates the credential before completing the upgrade. A missing or
/// invalid credential rejects the attempt with 401 and the socket never
/// reaches the protocol loop; the client must reconnect with a fresh token.
pub async fn team_chat_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(params): Query<ConnectParams>,
    State(state): State<AppState>,
) -> Response {
    let token = match bearer_token(&headers).or(params.token) {
        Some(token) => token,
        None => {
            tracing::warn!("Connection attempt without credential");
            return reject(ChatError::NoCredential);
        }
    };

    let identity = match verify_identity(&token) {
        Ok(identity) => identity,
        Err(err) => return reject(err),
    };

    tracing::info!(
        "User {} ({}) connecting to team chat",
        identity.user_id,
        identity.username
    );
    ws.on_upgrade(move |socket| run_socket(socket, identity, state))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn reject(err: ChatError) -> Response {
    (err.status_code(), err.to_string()).into_response()
}

/// One authenticated connection's protocol state
///
/// Owns the connection id and the identity resolved at the handshake, plus
/// the sending half of the connection's outbound channel. Room subscriptions
/// live in the registry; dropping them all on disconnect is the session's
/// only cleanup duty.
pub struct ChatSession {
    conn_id: ConnectionId,
    identity: Identity,
    pool: SqlitePool,
    rooms: Arc<RoomRegistry>,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

impl ChatSession {
    /// Register a new connection: allocate its id and outbound channel and
    /// auto-join the personal room.
    pub fn connect(
        identity: Identity,
        pool: SqlitePool,
        rooms: Arc<RoomRegistry>,
    ) -> (Self, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();
        rooms.subscribe(RoomId::User(identity.user_id), conn_id, identity.user_id, &tx);

        let session = Self {
            conn_id,
            identity,
            pool,
            rooms,
            tx,
        };
        (session, rx)
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.conn_id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Process one client command
    pub async fn handle(&self, command: ClientCommand) -> Result<(), ChatError> {
        match command {
            ClientCommand::JoinTeam { team_id } => self.join_team(team_id).await,
            ClientCommand::SendMessage { team_id, content } => {
                self.send_message(team_id, &content).await
            }
            ClientCommand::LoadHistory { team_id, limit } => {
                self.load_history(team_id, limit).await
            }
        }
    }

    /// Report a rejected action to this connection only
    pub fn report_error(&self, err: &ChatError) {
        self.reply(ServerEvent::Error {
            message: err.to_string(),
        });
    }

    /// Drop every room subscription. Persisted membership is untouched.
    pub fn disconnect(&self) {
        self.rooms.remove_connection(self.conn_id);
        tracing::info!(
            "User {} ({}) disconnected",
            self.identity.user_id,
            self.identity.username
        );
    }

    async fn join_team(&self, team_id: i64) -> Result<(), ChatError> {
        self.check_membership(team_id).await?;
        self.rooms.subscribe(
            RoomId::Team(team_id),
            self.conn_id,
            self.identity.user_id,
            &self.tx,
        );
        self.reply(ServerEvent::JoinedTeam { team_id });
        tracing::info!(
            "User {} joined team {} room",
            self.identity.user_id,
            team_id
        );
        Ok(())
    }

    async fn send_message(&self, team_id: i64, content: &str) -> Result<(), ChatError> {
        // Membership is re-checked even if this connection joined earlier:
        // a kick may have landed since, ahead of the eviction push.
        self.check_membership(team_id).await?;

        let message =
            messages::insert_message(&self.pool, team_id, self.identity.user_id, content).await?;
        let delivered = self
            .rooms
            .to_team(team_id, &ServerEvent::NewMessage(message));
        tracing::debug!(
            "Message in team {} fanned out to {} connection(s)",
            team_id,
            delivered
        );
        Ok(())
    }

    async fn load_history(&self, team_id: i64, limit: Option<i64>) -> Result<(), ChatError> {
        self.check_membership(team_id).await?;

        let messages = messages::list_messages(&self.pool, team_id, limit).await?;
        // Private reply to the requesting connection, not a broadcast
        self.reply(ServerEvent::History { team_id, messages });
        Ok(())
    }

    /// Fresh authorization check for a room-scoped action
    async fn check_membership(&self, team_id: i64) -> Result<(), ChatError> {
        if team_id <= 0 {
            return Err(ChatError::InvalidTeamId);
        }
        if !membership::is_member(&self.pool, team_id, self.identity.user_id).await? {
            return Err(ChatError::NotAMember);
        }
        Ok(())
    }

    fn reply(&self, event: ServerEvent) {
        // Failure means the socket task is already gone
        let _ = self.tx.send(event);
    }
}

/// Drive one WebSocket connection until it closes
async fn run_socket(socket: WebSocket, identity: Identity, state: AppState) {
    let (session, mut events) =
        ChatSession::connect(identity, state.pool.clone(), state.rooms.clone());
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientCommand>(text.as_str()) {
                        Ok(command) => {
                            if let Err(err) = session.handle(command).await {
                                tracing::debug!(
                                    "Rejected action from user {}: {}",
                                    session.identity().user_id,
                                    err
                                );
                                session.report_error(&err);
                            }
                        }
                        Err(err) => {
                            session.report_error(&ChatError::Protocol(err));
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {
                    // Binary and ping/pong frames are not part of the protocol
                }
                Some(Err(err)) => {
                    tracing::debug!("Socket read error: {}", err);
                    break;
                }
            },
            outbound = events.recv() => match outbound {
                Some(event) => {
                    let json = match serde_json::to_string(&event) {
                        Ok(json) => json,
                        Err(err) => {
                            tracing::error!("Failed to serialize event: {}", err);
                            continue;
                        }
                    };
                    if sink.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    session.disconnect();
}
