/// Access token claims (RFC 7519 registered claims only)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

/// Issuer stamped into every access token
pub const ISSUER: &str = "chirpy";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        Self::issued_at(user_id, ttl, Utc::now())
    }

    pub fn issued_at(user_id: Uuid, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }

    /// Parse the subject back into a user ID
    ///
    /// # Errors
    /// A subject that is not a UUID makes the whole token invalid.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Auth(AuthError::TokenInvalid))
    }
}
