/// User Routes
///
/// Account creation and profile update.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::session;
use crate::store::{Store, User};

/// Credentials for registration and profile update
#[derive(Deserialize)]
pub struct UserRequest {
    pub email: String,
    pub password: String,
}

/// Public user fields. The password hash never leaves the server.
#[derive(Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub email: String,
    pub is_upgraded: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            created_at: user.created_at,
            updated_at: user.updated_at,
            email: user.email.clone(),
            is_upgraded: user.is_upgraded,
        }
    }
}

/// POST /api/users
///
/// # Errors
/// - 400: missing or invalid email/password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<UserRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let user = session::register(store.get_ref(), &form.email, &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %user.id,
        "User created"
    );
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// PUT /api/users
///
/// **Requires a valid access token.**
///
/// # Errors
/// - 400: missing or invalid email/password
/// - 401: missing, invalid or expired token
/// - 409: new email belongs to another account
pub async fn update_user(
    caller: AuthenticatedUser,
    form: web::Json<UserRequest>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(caller.0.id);

    let user =
        session::update_profile(store.get_ref(), caller.0.id, &form.email, &form.password).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = ?context.user_id,
        "User updated"
    );
    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
