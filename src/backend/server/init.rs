//! Server Initialization
//!
//! Builds the application once at startup: database pool, room registry,
//! lifecycle bridge, then the router. The bridge is exposed on the returned
//! state so the embedding CRUD layer can hold it and push lifecycle events;
//! nothing here is a process-global.

use std::sync::Arc;

use axum::Router;

use crate::backend::bridge::EventBridge;
use crate::backend::rooms::RoomRegistry;
use crate::backend::routes::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;

/// The assembled application
pub struct App {
    /// Router ready to serve
    pub router: Router<()>,
    /// Shared state; `state.bridge` is the CRUD layer's push handle
    pub state: AppState,
}

/// Create and configure the application
///
/// # Initialization Steps
///
/// 1. Connect to the database and apply the schema
/// 2. Create the room registry (the only cross-connection shared state)
/// 3. Create the lifecycle bridge over the registry
/// 4. Assemble the router
pub async fn create_app() -> Result<App, sqlx::Error> {
    tracing::info!("Initializing SquadHub realtime server");

    let pool = load_database().await?;

    let rooms = Arc::new(RoomRegistry::new());
    let bridge = Arc::new(EventBridge::new(rooms.clone()));

    let state = AppState {
        pool,
        rooms,
        bridge,
    };
    let router = create_router(state.clone());

    tracing::info!("Router configured");
    Ok(App { router, state })
}
