//! Application State
//!
//! The state container shared by all handlers: the database pool, the room
//! registry, and the lifecycle bridge. `FromRef` implementations let axum
//! handlers extract just the piece they need.

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::backend::bridge::EventBridge;
use crate::backend::rooms::RoomRegistry;

/// Application state for the realtime server
///
/// Cloning is cheap: the pool is internally shared and the registry and
/// bridge are behind `Arc`s. The bridge is also the handle the embedding
/// CRUD layer keeps to push lifecycle events.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool backing membership and message reads
    pub pool: SqlitePool,

    /// Live room subscriptions
    pub rooms: Arc<RoomRegistry>,

    /// Lifecycle event bridge, constructed once at startup
    pub bridge: Arc<EventBridge>,
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.pool.clone()
    }
}

impl FromRef<AppState> for Arc<RoomRegistry> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.rooms.clone()
    }
}

impl FromRef<AppState> for Arc<EventBridge> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.bridge.clone()
    }
}
