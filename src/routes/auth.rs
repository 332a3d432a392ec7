/// Authentication Routes
///
/// Login, access token refresh and refresh token revocation.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::configuration::JwtSettings;
use crate::error::{AppError, ErrorContext};
use crate::middleware::BearerToken;
use crate::routes::users::UserResponse;
use crate::session;
use crate::store::Store;

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access token lifetime; capped at one hour
    pub expires_in_seconds: Option<i64>,
}

/// Public user fields plus both tokens
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/login
///
/// # Errors
/// - 400: missing email or password
/// - 401: unknown email or wrong password (indistinguishable)
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn Store>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let outcome = session::login(
        store.get_ref(),
        jwt_config.get_ref(),
        &form.email,
        &form.password,
        form.expires_in_seconds,
    )
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %outcome.user.id,
        "Login succeeded"
    );

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: UserResponse::from(&outcome.user),
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// POST /api/refresh
///
/// Takes the refresh token as a bearer credential. The refresh token is not
/// rotated.
///
/// # Errors
/// - 401: missing, unknown, expired or revoked refresh token
pub async fn refresh(
    refresh_token: BearerToken,
    store: web::Data<dyn Store>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let token = session::refresh(store.get_ref(), jwt_config.get_ref(), &refresh_token.0).await?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// POST /api/revoke
///
/// Always 204 once a bearer credential is present, whether or not it was a
/// live token.
///
/// # Errors
/// - 401: no bearer credential
/// - 5xx: store failure
pub async fn revoke(
    refresh_token: BearerToken,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    session::revoke(store.get_ref(), &refresh_token.0).await?;
    Ok(HttpResponse::NoContent().finish())
}
