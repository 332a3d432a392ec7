/// JWT Access Token Issuance and Validation
///
/// Access tokens are HS256 JWTs and are never persisted. Validity is decided
/// by signature, algorithm, issuer and expiry at the moment of validation.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::{AppError, AuthError};

/// Hard ceiling and default for access token lifetime
pub const MAX_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Resolve the lifetime for a new access token.
///
/// Requests at or above the ceiling are clamped to it. Absent or
/// non-positive requests get the default.
pub fn session_ttl(requested_seconds: Option<i64>) -> Duration {
    let seconds = match requested_seconds {
        Some(requested) if requested > 0 && requested < MAX_ACCESS_TOKEN_TTL_SECONDS => requested,
        _ => MAX_ACCESS_TOKEN_TTL_SECONDS,
    };
    Duration::seconds(seconds)
}

/// Sign a new access token for `user_id`
///
/// # Errors
/// Returns an internal error if encoding fails
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AppError> {
    encode_claims(&Claims::new(user_id, ttl), secret)
}

pub(crate) fn encode_claims(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(ALGORITHM),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Validate an access token and return its subject.
///
/// # Errors
/// Every failure (bad signature, foreign or `none` algorithm, wrong
/// issuer, expiry, unparseable subject) is `AuthError::TokenInvalid`.
pub fn validate_access_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::warn!(error = %e, "JWT validation error");
        AppError::Auth(AuthError::TokenInvalid)
    })?;

    claims.user_id()
}
