//! Route Configuration
//!
//! HTTP surface of the realtime server: the WebSocket endpoint and a health
//! probe. The CRUD surface of the wider platform lives in its own service.

/// Router assembly
pub mod router;

pub use router::create_router;
