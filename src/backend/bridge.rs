//! Lifecycle Event Bridge
//!
//! The push channel from the CRUD layer into live connections. The CRUD
//! layer commits its membership mutation first, then calls one of the two
//! entry points here; delivery is best-effort and never fails the caller.
//! Clients that miss a push reconcile through ordinary reads on reconnect.
//!
//! The bridge is constructed once at startup and handed to the CRUD layer as
//! an explicit dependency; there is no ambient global namespace handle.

use std::sync::Arc;

use crate::backend::rooms::RoomRegistry;
use crate::shared::{LifecycleEvent, ServerEvent};

/// Fans team-lifecycle notifications out to connected sockets
pub struct EventBridge {
    rooms: Arc<RoomRegistry>,
}

impl EventBridge {
    pub fn new(rooms: Arc<RoomRegistry>) -> Self {
        Self { rooms }
    }

    /// Deliver an event to a user's personal room.
    ///
    /// No-op when the user has no live connection.
    pub fn notify_user(&self, user_id: i64, event: LifecycleEvent) {
        let name = event.name();
        let delivered = self.rooms.to_user(user_id, &ServerEvent::from(event));
        if delivered == 0 {
            tracing::debug!("No live connection for user {} ({})", user_id, name);
        } else {
            tracing::info!(
                "Delivered {} to {} connection(s) of user {}",
                name,
                delivered,
                user_id
            );
        }
    }

    /// Deliver an event to every connection in a team room.
    ///
    /// A kick is broadcast to the room first, so the kicked user's own
    /// connections still receive it, and that user is then evicted from the
    /// room. Membership was already removed by the caller, so anything the
    /// evicted socket sends afterwards fails its membership check anyway.
    pub fn notify_team(&self, team_id: i64, event: LifecycleEvent) {
        let name = event.name();
        let kicked = match &event {
            LifecycleEvent::MemberKicked { user_id, .. } => Some(*user_id),
            _ => None,
        };

        let delivered = self.rooms.to_team(team_id, &ServerEvent::from(event));
        if delivered == 0 {
            tracing::debug!("No subscribers in team {} for {}", team_id, name);
        } else {
            tracing::info!(
                "Delivered {} to {} connection(s) in team {}",
                name,
                delivered,
                team_id
            );
        }

        if let Some(user_id) = kicked {
            let evicted = self.rooms.evict_user(team_id, user_id);
            tracing::info!(
                "Evicted {} connection(s) of user {} from team {}",
                evicted,
                user_id,
                team_id
            );
        }
    }
}
