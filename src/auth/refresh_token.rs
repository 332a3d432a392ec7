/// Refresh Token Management
///
/// Refresh tokens are:
/// - 32 bytes from the OS RNG, hex-encoded (64 characters)
/// - Hashed with SHA-256 before storage (the plaintext is never stored)
/// - Valid for a fixed 60 days, independent of access token lifetime
/// - Not rotated on use; valid until expiry or explicit revocation

use chrono::{Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{AppError, AuthError};
use crate::store::{RefreshTokenRecord, RefreshTokenStore};

pub const REFRESH_TOKEN_TTL_DAYS: i64 = 60;

const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token (plaintext, handed to the client once)
///
/// # Errors
/// Only if the OS entropy source fails
pub fn generate_refresh_token() -> Result<String, AppError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AppError::Internal(format!("Entropy source failure: {}", e)))?;
    Ok(hex::encode(bytes))
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Persist a refresh token for `user_id` with the fixed 60-day expiry
pub async fn save_refresh_token<S>(store: &S, user_id: Uuid, token: &str) -> Result<(), AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let expires_at = Utc::now() + Duration::days(REFRESH_TOKEN_TTL_DAYS);
    store
        .save_refresh_token(RefreshTokenRecord {
            token_hash: hash_token(token),
            user_id,
            expires_at,
        })
        .await
}

/// Resolve a refresh token to its owner.
///
/// # Errors
/// Unknown, expired, revoked, and orphaned tokens all yield
/// `AuthError::TokenInvalid`. Store failures pass through.
pub async fn resolve_refresh_token<S>(store: &S, token: &str) -> Result<Uuid, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    match store
        .find_active_refresh_token(&hash_token(token), Utc::now())
        .await?
    {
        Some(user_id) => Ok(user_id),
        None => {
            tracing::warn!("Refresh token rejected");
            Err(AppError::Auth(AuthError::TokenInvalid))
        }
    }
}

/// Revoke a refresh token. Idempotent; unknown tokens are not an error.
///
/// # Errors
/// Store failures only
pub async fn revoke_refresh_token<S>(store: &S, token: &str) -> Result<(), AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let revoked = store
        .revoke_refresh_token(&hash_token(token), Utc::now())
        .await?;
    tracing::info!(revoked, "Refresh token revocation processed");
    Ok(())
}
