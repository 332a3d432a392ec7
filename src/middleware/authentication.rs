/// Request authentication extractors
///
/// Handlers declare the credential they need as an argument:
/// - `AuthenticatedUser`: valid access token whose subject exists
/// - `BearerToken`: raw bearer credential (refresh tokens)
///
/// Extraction failures short-circuit the handler with a 401.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::get_bearer_token;
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::session;
use crate::store::{Store, User};

/// The caller, resolved from `Authorization: Bearer <access token>`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = get_bearer_token(req.headers()).map(str::to_owned);
        let store = req.app_data::<web::Data<dyn Store>>().cloned();
        let jwt_config = req.app_data::<web::Data<JwtSettings>>().cloned();

        Box::pin(async move {
            let token = token.map_err(|e| {
                tracing::warn!("Missing or invalid Authorization header");
                AppError::Auth(e)
            })?;

            let (store, jwt_config) = match (store, jwt_config) {
                (Some(store), Some(jwt_config)) => (store, jwt_config),
                _ => {
                    return Err(AppError::Internal(
                        "authentication state is not registered".to_string(),
                    ))
                }
            };

            let user = session::authenticate(store.get_ref(), jwt_config.get_ref(), &token).await?;
            tracing::debug!(user_id = %user.id, "Access token validated");

            Ok(AuthenticatedUser(user))
        })
    }
}

/// Raw `Authorization: Bearer <token>` value, not interpreted
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            get_bearer_token(req.headers())
                .map(|token| BearerToken(token.to_string()))
                .map_err(AppError::Auth),
        )
    }
}
