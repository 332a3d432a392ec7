/// Session orchestration
///
/// Registration, login, refresh, revoke, profile update and access token
/// authentication. Nothing is cached in process: every decision is derived
/// from a token signature or a store lookup.

use uuid::Uuid;

use crate::auth::{
    generate_refresh_token, hash_password, issue_access_token, resolve_refresh_token,
    revoke_refresh_token, save_refresh_token, session_ttl, validate_access_token,
    validate_password_input, verify_password,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::{RefreshTokenStore, User, UserStore};
use crate::validators::{is_valid_email, require_non_empty};

/// Result of a successful login
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Create an account
pub async fn register<S>(store: &S, email: &str, password: &str) -> Result<User, AppError>
where
    S: UserStore + ?Sized,
{
    let email = is_valid_email(email)?;
    validate_password_input(password)?;

    let hashed_password = hash_password(password)?;
    let user = store.create_user(&email, &hashed_password).await?;

    tracing::info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Verify credentials and open a session.
///
/// Unknown email and wrong password are the same failure.
pub async fn login<S>(
    store: &S,
    jwt: &JwtSettings,
    email: &str,
    password: &str,
    expires_in_seconds: Option<i64>,
) -> Result<LoginOutcome, AppError>
where
    S: UserStore + RefreshTokenStore + ?Sized,
{
    require_non_empty("email", email)?;
    // Same rule as registration, so every stored password can log in
    validate_password_input(password)?;

    let user = match store.get_user_by_email(email).await? {
        Some(user) => user,
        None => {
            tracing::warn!("Login attempt for unknown email");
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    if !verify_password(password, &user.hashed_password) {
        tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let access_token = issue_access_token(user.id, &jwt.secret, session_ttl(expires_in_seconds))?;
    let refresh_token = generate_refresh_token()?;
    save_refresh_token(store, user.id, &refresh_token).await?;

    tracing::info!(user_id = %user.id, "User logged in");
    Ok(LoginOutcome {
        user,
        access_token,
        refresh_token,
    })
}

/// Mint a fresh default-lifetime access token from a refresh token.
/// The refresh token itself stays valid.
pub async fn refresh<S>(store: &S, jwt: &JwtSettings, refresh_token: &str) -> Result<String, AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    let user_id = resolve_refresh_token(store, refresh_token).await?;
    let access_token = issue_access_token(user_id, &jwt.secret, session_ttl(None))?;

    tracing::info!(user_id = %user_id, "Access token refreshed");
    Ok(access_token)
}

/// Revoke a refresh token. Succeeds whether or not the token was live.
pub async fn revoke<S>(store: &S, refresh_token: &str) -> Result<(), AppError>
where
    S: RefreshTokenStore + ?Sized,
{
    revoke_refresh_token(store, refresh_token).await
}

/// Resolve an access token to an existing user.
///
/// A valid signature whose subject no longer exists is an invalid token.
pub async fn authenticate<S>(store: &S, jwt: &JwtSettings, access_token: &str) -> Result<User, AppError>
where
    S: UserStore + ?Sized,
{
    let user_id = validate_access_token(access_token, &jwt.secret)?;
    match store.get_user(user_id).await? {
        Some(user) => Ok(user),
        None => {
            tracing::warn!(user_id = %user_id, "Access token subject does not exist");
            Err(AuthError::TokenInvalid.into())
        }
    }
}

/// Replace the caller's email and password
pub async fn update_profile<S>(
    store: &S,
    user_id: Uuid,
    email: &str,
    password: &str,
) -> Result<User, AppError>
where
    S: UserStore + ?Sized,
{
    let email = is_valid_email(email)?;
    validate_password_input(password)?;

    let hashed_password = hash_password(password)?;
    let user = store
        .update_user(user_id, &email, &hashed_password)
        .await?
        .ok_or(AppError::Auth(AuthError::TokenInvalid))?;

    tracing::info!(user_id = %user.id, "User profile updated");
    Ok(user)
}
