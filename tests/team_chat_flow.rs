//! End-to-end flows through the realtime core: membership-gated joins,
//! message fan-out, history snapshots, and the kick/eviction path driven the
//! way the CRUD layer drives it (mutate persisted state, then notify the
//! bridge).

use std::sync::Arc;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use sqlx::SqlitePool;
use tokio::sync::mpsc::UnboundedReceiver;

use squadhub::backend::auth::sessions::create_token;
use squadhub::backend::auth::Identity;
use squadhub::backend::bridge::EventBridge;
use squadhub::backend::error::ChatError;
use squadhub::backend::rooms::{RoomId, RoomRegistry};
use squadhub::backend::routes::create_router;
use squadhub::backend::server::state::AppState;
use squadhub::backend::session::ChatSession;
use squadhub::backend::store::{schema, teams};
use squadhub::shared::{ClientCommand, ServerEvent};

struct Fixture {
    pool: SqlitePool,
    rooms: Arc<RoomRegistry>,
    bridge: EventBridge,
}

async fn fixture() -> Fixture {
    let pool = schema::memory_pool().await.unwrap();
    let rooms = Arc::new(RoomRegistry::new());
    let bridge = EventBridge::new(rooms.clone());
    Fixture { pool, rooms, bridge }
}

fn identity(user_id: i64, username: &str) -> Identity {
    Identity {
        user_id,
        username: username.to_string(),
    }
}

fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn kicked_member_is_notified_evicted_and_locked_out() {
    let fx = fixture().await;
    let alice = teams::create_user(&fx.pool, "alice").await.unwrap();
    let bob = teams::create_user(&fx.pool, "bob").await.unwrap();
    let team = teams::create_team(&fx.pool, "Night Owls", alice).await.unwrap();
    teams::add_member(&fx.pool, team, bob).await.unwrap();

    let (alice_session, mut alice_rx) =
        ChatSession::connect(identity(alice, "alice"), fx.pool.clone(), fx.rooms.clone());
    let (bob_session, mut bob_rx) =
        ChatSession::connect(identity(bob, "bob"), fx.pool.clone(), fx.rooms.clone());
    alice_session
        .handle(ClientCommand::JoinTeam { team_id: team })
        .await
        .unwrap();
    bob_session
        .handle(ClientCommand::JoinTeam { team_id: team })
        .await
        .unwrap();
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    // The CRUD layer removes the membership row, then invokes the bridge
    teams::remove_member(&fx.pool, team, bob).await.unwrap();
    fx.bridge.notify_team(
        team,
        squadhub::shared::LifecycleEvent::MemberKicked {
            team_id: team,
            user_id: bob,
        },
    );

    // Both connections saw the kick event, including the kicked one
    let expected = ServerEvent::MemberKicked {
        team_id: team,
        user_id: bob,
    };
    assert_eq!(drain(&mut alice_rx), vec![expected.clone()]);
    assert_eq!(drain(&mut bob_rx), vec![expected]);

    // Bob's subscription is gone: team traffic no longer reaches him
    assert!(!fx
        .rooms
        .is_subscribed(RoomId::Team(team), bob_session.connection_id()));
    alice_session
        .handle(ClientCommand::SendMessage {
            team_id: team,
            content: "one down".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(drain(&mut bob_rx), vec![]);

    // And his next requests fail the membership check
    assert_matches!(
        bob_session
            .handle(ClientCommand::LoadHistory {
                team_id: team,
                limit: None,
            })
            .await,
        Err(ChatError::NotAMember)
    );
    assert_matches!(
        bob_session
            .handle(ClientCommand::SendMessage {
                team_id: team,
                content: "hello?".to_string(),
            })
            .await,
        Err(ChatError::NotAMember)
    );
}

#[tokio::test]
async fn history_snapshot_matches_sent_messages() {
    let fx = fixture().await;
    let alice = teams::create_user(&fx.pool, "alice").await.unwrap();
    let team = teams::create_team(&fx.pool, "Solo Queue", alice).await.unwrap();

    let (session, mut rx) =
        ChatSession::connect(identity(alice, "alice"), fx.pool.clone(), fx.rooms.clone());
    session
        .handle(ClientCommand::JoinTeam { team_id: team })
        .await
        .unwrap();
    drain(&mut rx);

    // Fresh team: empty history
    session
        .handle(ClientCommand::LoadHistory {
            team_id: team,
            limit: Some(50),
        })
        .await
        .unwrap();
    assert_matches!(
        drain(&mut rx).as_slice(),
        [ServerEvent::History { messages, .. }] if messages.is_empty()
    );

    session
        .handle(ClientCommand::SendMessage {
            team_id: team,
            content: "gg".to_string(),
        })
        .await
        .unwrap();
    drain(&mut rx);

    session
        .handle(ClientCommand::LoadHistory {
            team_id: team,
            limit: Some(50),
        })
        .await
        .unwrap();
    assert_matches!(
        drain(&mut rx).as_slice(),
        [ServerEvent::History { messages, .. }]
            if messages.len() == 1 && messages[0].content == "gg"
    );
}

#[tokio::test]
async fn concurrent_senders_are_observed_in_the_same_order() {
    let fx = fixture().await;
    let alice = teams::create_user(&fx.pool, "alice").await.unwrap();
    let bob = teams::create_user(&fx.pool, "bob").await.unwrap();
    let team = teams::create_team(&fx.pool, "Night Owls", alice).await.unwrap();
    teams::add_member(&fx.pool, team, bob).await.unwrap();

    let (alice_session, mut alice_rx) =
        ChatSession::connect(identity(alice, "alice"), fx.pool.clone(), fx.rooms.clone());
    let (bob_session, mut bob_rx) =
        ChatSession::connect(identity(bob, "bob"), fx.pool.clone(), fx.rooms.clone());
    alice_session
        .handle(ClientCommand::JoinTeam { team_id: team })
        .await
        .unwrap();
    bob_session
        .handle(ClientCommand::JoinTeam { team_id: team })
        .await
        .unwrap();
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    alice_session
        .handle(ClientCommand::SendMessage {
            team_id: team,
            content: "first".to_string(),
        })
        .await
        .unwrap();
    bob_session
        .handle(ClientCommand::SendMessage {
            team_id: team,
            content: "second".to_string(),
        })
        .await
        .unwrap();

    let order = |events: Vec<ServerEvent>| -> Vec<String> {
        events
            .into_iter()
            .map(|event| match event {
                ServerEvent::NewMessage(message) => message.content,
                other => panic!("unexpected event: {:?}", other),
            })
            .collect()
    };
    let alice_order = order(drain(&mut alice_rx));
    let bob_order = order(drain(&mut bob_rx));

    assert_eq!(alice_order, vec!["first".to_string(), "second".to_string()]);
    assert_eq!(alice_order, bob_order);
}

#[tokio::test]
async fn leadership_transfer_notifies_the_team_room() {
    let fx = fixture().await;
    let alice = teams::create_user(&fx.pool, "alice").await.unwrap();
    let bob = teams::create_user(&fx.pool, "bob").await.unwrap();
    let team = teams::create_team(&fx.pool, "Night Owls", alice).await.unwrap();
    teams::add_member(&fx.pool, team, bob).await.unwrap();

    let (session, mut rx) =
        ChatSession::connect(identity(bob, "bob"), fx.pool.clone(), fx.rooms.clone());
    session
        .handle(ClientCommand::JoinTeam { team_id: team })
        .await
        .unwrap();
    drain(&mut rx);

    teams::transfer_leadership(&fx.pool, team, bob).await.unwrap();
    fx.bridge.notify_team(
        team,
        squadhub::shared::LifecycleEvent::LeaderChanged {
            team_id: team,
            new_leader_id: bob,
        },
    );

    assert_eq!(
        drain(&mut rx),
        vec![ServerEvent::LeaderChanged {
            team_id: team,
            new_leader_id: bob,
        }]
    );
}

#[tokio::test]
async fn join_accept_flow_reaches_the_personal_room() {
    let fx = fixture().await;
    let alice = teams::create_user(&fx.pool, "alice").await.unwrap();
    let bob = teams::create_user(&fx.pool, "bob").await.unwrap();
    let team = teams::create_team(&fx.pool, "Night Owls", alice).await.unwrap();

    // Bob is connected (personal room only) while his request is pending
    let (bob_session, mut bob_rx) =
        ChatSession::connect(identity(bob, "bob"), fx.pool.clone(), fx.rooms.clone());

    // Leader accepts: CRUD inserts the membership, then notifies the user
    teams::add_member(&fx.pool, team, bob).await.unwrap();
    fx.bridge
        .notify_user(bob, squadhub::shared::LifecycleEvent::JoinAccepted { team_id: team });

    assert_eq!(
        drain(&mut bob_rx),
        vec![ServerEvent::JoinAccepted { team_id: team }]
    );

    // Now the join succeeds
    bob_session
        .handle(ClientCommand::JoinTeam { team_id: team })
        .await
        .unwrap();
    assert_eq!(
        drain(&mut bob_rx),
        vec![ServerEvent::JoinedTeam { team_id: team }]
    );
}

mod handshake {
    use super::*;
    use pretty_assertions::assert_eq;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn app() -> axum::Router<()> {
        let pool = schema::memory_pool().await.unwrap();
        let rooms = Arc::new(RoomRegistry::new());
        let bridge = Arc::new(EventBridge::new(rooms.clone()));
        create_router(AppState { pool, rooms, bridge })
    }

    fn upgrade_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("GET")
            .uri(uri)
            .header("connection", "upgrade")
            .header("upgrade", "websocket")
            .header("sec-websocket-version", "13")
            .header("sec-websocket-key", "dGhlIHNhbXBsZSBub25jZQ==");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn missing_credential_is_rejected_before_the_protocol_runs() {
        let app = app().await;
        let response = app.oneshot(upgrade_request("/team-chat", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Unauthorized (no credential)");
    }

    #[tokio::test]
    async fn invalid_credential_is_rejected() {
        let app = app().await;
        let response = app
            .oneshot(upgrade_request("/team-chat", Some("not.a.token")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&body[..], b"Unauthorized (invalid credential)");
    }

    #[tokio::test]
    async fn valid_credential_upgrades() {
        let app = app().await;
        let token = create_token(1, "alice").unwrap();
        let response = app
            .oneshot(upgrade_request(
                &format!("/team-chat?token={}", token),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SWITCHING_PROTOCOLS);
    }

    #[tokio::test]
    async fn health_probe_answers() {
        let app = app().await;
        let response = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, serde_json::json!({ "ok": true }));
    }
}
