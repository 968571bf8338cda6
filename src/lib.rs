//! SquadHub - Realtime Team Chat Core
//!
//! SquadHub is the realtime layer of a team-formation platform: a
//! membership-gated team chat served over WebSocket, with persisted message
//! history and out-of-band team-lifecycle notifications pushed to connected
//! clients.
//!
//! # Overview
//!
//! The library provides:
//! - Token-authenticated socket sessions with per-team room subscriptions
//! - Membership checks against persisted team state on every room-scoped
//!   action (membership can be revoked mid-session by the CRUD layer)
//! - Durable chat history with ordered replay
//! - A lifecycle event bridge the CRUD layer invokes after committing team
//!   mutations (join accepted, member kicked, leadership transfer), including
//!   forced eviction of kicked members from live rooms
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types exchanged with clients (commands, events,
//!   chat messages)
//! - **`backend`** - The server: session protocol, room registry, event
//!   bridge, persistence adapters, auth, and HTTP assembly
//!
//! # Usage
//!
//! ```rust,no_run
//! use squadhub::backend::server::init::create_app;
//!
//! # async fn example() -> Result<(), sqlx::Error> {
//! let app = create_app().await?;
//! // Serve app.router; hand app.state.bridge to the CRUD layer
//! # Ok(())
//! # }
//! ```

/// Wire types shared with clients
pub mod shared;

/// Backend server-side code
pub mod backend;
