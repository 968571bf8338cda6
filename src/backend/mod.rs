//! Backend Module
//!
//! The server side of the realtime team chat: socket session protocol, room
//! registry, lifecycle event bridge, persistence adapters, authentication,
//! and HTTP assembly.
//!
//! # Architecture
//!
//! Each client connection is authenticated at the WebSocket handshake and
//! then runs the session protocol in [`session`]. Room fan-out goes through
//! the [`rooms`] registry, which is the only cross-connection shared state.
//! The CRUD layer (an external collaborator) mutates persisted membership and
//! then pushes lifecycle events through [`bridge`]; persisted state is always
//! the source of truth, so every room-scoped action re-checks membership via
//! [`store::membership`] instead of trusting the live subscription set.

/// Server assembly (config, state, init)
pub mod server;

/// Token authentication
pub mod auth;

/// Persistence adapters (membership, messages, teams)
pub mod store;

/// Room registry mapping logical targets to live connections
pub mod rooms;

/// Per-connection chat session protocol
pub mod session;

/// Lifecycle event bridge invoked by the CRUD layer
pub mod bridge;

/// Backend error taxonomy
pub mod error;

/// HTTP route configuration
pub mod routes;
