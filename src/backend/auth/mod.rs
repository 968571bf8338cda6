//! Authentication
//!
//! Bearer-token verification for socket connections. Token issuing lives in
//! the external login flow; this module carries the shared claims shape and
//! the verification gate that resolves a credential to an [`Identity`].

/// JWT claims, token creation and verification
pub mod sessions;

pub use sessions::{verify_identity, Identity};
