//! Backend Error Types
//!
//! The failure taxonomy of the realtime layer. Authentication failures are
//! fatal to the connection attempt and map to an HTTP status on the
//! handshake; everything else is reported to the requesting connection as an
//! `error` event and leaves the connection open.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised by the chat session protocol and its collaborators
#[derive(Debug, Error)]
pub enum ChatError {
    /// No credential was presented at connect time
    #[error("Unauthorized (no credential)")]
    NoCredential,

    /// A credential was presented but did not verify
    #[error("Unauthorized (invalid credential)")]
    InvalidCredential,

    /// The acting user is not a member of the target team
    #[error("Not a member of this team")]
    NotAMember,

    /// The team id is not a well-formed identifier
    #[error("Invalid team id")]
    InvalidTeamId,

    /// The message text is empty after trimming
    #[error("Message content must not be empty")]
    InvalidContent,

    /// A persistence call failed; detail stays server-side
    #[error("Operation failed")]
    Persistence(#[from] sqlx::Error),

    /// The client sent a frame that does not parse as a command
    #[error("Malformed command: {0}")]
    Protocol(#[from] serde_json::Error),
}

impl ChatError {
    /// HTTP status for the connect-time reject path
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoCredential | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::NotAMember => StatusCode::FORBIDDEN,
            Self::InvalidTeamId | Self::InvalidContent | Self::Protocol(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
