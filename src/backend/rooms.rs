//! Room Registry
//!
//! Maps logical broadcast targets (`user:{id}`, `team:{id}`) to the live
//! connections subscribed to them. This is the only cross-connection shared
//! state in the realtime layer; every mutation happens under a single lock,
//! so joins, eviction, and disconnect cleanup are each atomic.
//!
//! Rooms have no persistent identity. A user room exists while any of that
//! user's connections is open; a team room exists while any member connection
//! has joined it. Delivery is best-effort: fanning out to a room with no
//! subscribers is a no-op.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Mutex;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::ServerEvent;

/// Identifier of one live transport session
pub type ConnectionId = Uuid;

/// A logical broadcast target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoomId {
    /// Personal room, auto-joined at connect; target for user-scoped
    /// notifications
    User(i64),
    /// Team room, joined only after a membership check
    Team(i64),
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomId::User(id) => write!(f, "user:{}", id),
            RoomId::Team(id) => write!(f, "team:{}", id),
        }
    }
}

/// Per-connection delivery handle held by the registry
struct ConnectionHandle {
    user_id: i64,
    tx: mpsc::UnboundedSender<ServerEvent>,
}

#[derive(Default)]
struct RegistryInner {
    /// Room to subscribed connections
    rooms: HashMap<RoomId, HashMap<ConnectionId, ConnectionHandle>>,
    /// Connection to the rooms it is in, for disconnect cleanup
    memberships: HashMap<ConnectionId, HashSet<RoomId>>,
}

/// Registry of live room subscriptions
#[derive(Default)]
pub struct RoomRegistry {
    inner: Mutex<RegistryInner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to a room. Idempotent for a connection already
    /// in the room.
    pub fn subscribe(
        &self,
        room: RoomId,
        conn: ConnectionId,
        user_id: i64,
        tx: &mpsc::UnboundedSender<ServerEvent>,
    ) {
        let mut inner = self.inner.lock().expect("room registry poisoned");
        inner.rooms.entry(room).or_default().insert(
            conn,
            ConnectionHandle {
                user_id,
                tx: tx.clone(),
            },
        );
        inner.memberships.entry(conn).or_default().insert(room);
        tracing::debug!("Connection {} subscribed to {}", conn, room);
    }

    /// Remove one connection's subscription to a room. Idempotent if the
    /// connection was never subscribed.
    pub fn unsubscribe(&self, room: RoomId, conn: ConnectionId) -> bool {
        let mut inner = self.inner.lock().expect("room registry poisoned");
        Self::remove_from_room(&mut inner, room, conn)
    }

    /// Drop every subscription a connection holds. Called on disconnect.
    pub fn remove_connection(&self, conn: ConnectionId) {
        let mut inner = self.inner.lock().expect("room registry poisoned");
        let rooms = inner.memberships.remove(&conn).unwrap_or_default();
        for room in rooms {
            if let Some(subscribers) = inner.rooms.get_mut(&room) {
                subscribers.remove(&conn);
                if subscribers.is_empty() {
                    inner.rooms.remove(&room);
                }
            }
        }
        tracing::debug!("Connection {} removed from all rooms", conn);
    }

    /// Deliver an event to every connection in a user's personal room.
    /// Returns the number of connections reached.
    pub fn to_user(&self, user_id: i64, event: &ServerEvent) -> usize {
        let inner = self.inner.lock().expect("room registry poisoned");
        Self::deliver(&inner, RoomId::User(user_id), event)
    }

    /// Deliver an event to every connection in a team room. Returns the
    /// number of connections reached.
    pub fn to_team(&self, team_id: i64, event: &ServerEvent) -> usize {
        let inner = self.inner.lock().expect("room registry poisoned");
        Self::deliver(&inner, RoomId::Team(team_id), event)
    }

    /// Forcibly remove every connection belonging to `user_id` from a team
    /// room. Returns the number of connections evicted; zero if the user had
    /// none there.
    pub fn evict_user(&self, team_id: i64, user_id: i64) -> usize {
        let mut inner = self.inner.lock().expect("room registry poisoned");
        let room = RoomId::Team(team_id);
        let targets: Vec<ConnectionId> = match inner.rooms.get(&room) {
            Some(subscribers) => subscribers
                .iter()
                .filter(|(_, handle)| handle.user_id == user_id)
                .map(|(conn, _)| *conn)
                .collect(),
            None => return 0,
        };

        for conn in &targets {
            Self::remove_from_room(&mut inner, room, *conn);
        }
        targets.len()
    }

    /// Whether a connection is currently subscribed to a room
    pub fn is_subscribed(&self, room: RoomId, conn: ConnectionId) -> bool {
        let inner = self.inner.lock().expect("room registry poisoned");
        inner
            .rooms
            .get(&room)
            .is_some_and(|subscribers| subscribers.contains_key(&conn))
    }

    /// Number of connections currently in a room
    pub fn room_size(&self, room: RoomId) -> usize {
        let inner = self.inner.lock().expect("room registry poisoned");
        inner.rooms.get(&room).map_or(0, HashMap::len)
    }

    fn deliver(inner: &RegistryInner, room: RoomId, event: &ServerEvent) -> usize {
        let Some(subscribers) = inner.rooms.get(&room) else {
            return 0;
        };
        let mut delivered = 0;
        for handle in subscribers.values() {
            // A closed receiver means the session task is tearing down; its
            // handles disappear when remove_connection runs.
            if handle.tx.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        delivered
    }

    fn remove_from_room(inner: &mut RegistryInner, room: RoomId, conn: ConnectionId) -> bool {
        let removed = inner
            .rooms
            .get_mut(&room)
            .is_some_and(|subscribers| subscribers.remove(&conn).is_some());
        if removed {
            if inner.rooms.get(&room).is_some_and(HashMap::is_empty) {
                inner.rooms.remove(&room);
            }
            if let Some(rooms) = inner.memberships.get_mut(&conn) {
                rooms.remove(&room);
                if rooms.is_empty() {
                    inner.memberships.remove(&conn);
                }
            }
        }
        removed
    }
}
