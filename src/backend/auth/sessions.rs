//! Session Tokens
//!
//! JWT generation and validation. Tokens are minted by the login flow and
//! verified once per connection at the WebSocket handshake; the resolved
//! identity is immutable for the connection's lifetime.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::error::ChatError;

/// Identity attached to a connection after a successful credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User id
    pub user_id: i64,
    /// Display name carried in the token claims
    pub username: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Display name
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Get JWT secret from environment
fn jwt_secret() -> String {
    std::env::var("JWT_SECRET").unwrap_or_else(|err| {
        tracing::warn!("Missing JWT_SECRET, using dev fallback: {}", err);
        "your-secret-key-change-in-production".to_string()
    })
}

/// Create a JWT token for a user
///
/// # Arguments
/// * `user_id` - User id
/// * `username` - Display name
///
/// # Returns
/// JWT token string
pub fn create_token(user_id: i64, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    // Token expires in 30 days
    let exp = now + (30 * 24 * 60 * 60);

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp,
        iat: now,
    };

    let secret = jwt_secret();
    let key = EncodingKey::from_secret(secret.as_ref());

    encode(&Header::default(), &claims, &key)
}

/// Verify and decode a JWT token
///
/// # Arguments
/// * `token` - JWT token string
///
/// # Returns
/// Decoded claims or error
pub fn verify_token(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = jwt_secret();
    let key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)?;
    Ok(token_data.claims)
}

/// Resolve a bearer credential to an [`Identity`]
///
/// Any verification or decoding failure collapses to
/// [`ChatError::InvalidCredential`]; the caller decides how to surface it.
pub fn verify_identity(token: &str) -> Result<Identity, ChatError> {
    let claims = verify_token(token).map_err(|e| {
        tracing::warn!("Token verification failed: {:?}", e);
        ChatError::InvalidCredential
    })?;

    let user_id = claims
        .sub
        .parse::<i64>()
        .map_err(|_| ChatError::InvalidCredential)?;

    Ok(Identity {
        user_id,
        username: claims.username,
    })
}
