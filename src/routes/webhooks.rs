/// Billing webhook (Polka)

use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::get_api_key;
use crate::configuration::WebhookSettings;
use crate::error::{AppError, AuthError, ValidationError};
use crate::store::{Store, UserStore};

pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: WebhookData,
}

/// Only `user.upgraded` needs a user id; other events may omit it
#[derive(Deserialize, Default)]
pub struct WebhookData {
    pub user_id: Option<Uuid>,
}

/// POST /api/polka/webhooks
///
/// Body is parsed before the key is checked, so malformed payloads are 400
/// regardless of credentials.
///
/// # Errors
/// - 400: malformed payload, or `user.upgraded` without `data.user_id`
/// - 401: missing or wrong `Authorization: ApiKey <key>`
/// - 404: `user.upgraded` for an unknown user
pub async fn polka_webhook(
    req: HttpRequest,
    payload: web::Json<WebhookEvent>,
    store: web::Data<dyn Store>,
    webhook_config: web::Data<WebhookSettings>,
) -> Result<HttpResponse, AppError> {
    let key = get_api_key(req.headers())?;
    if key != webhook_config.polka_key {
        tracing::warn!("Webhook called with wrong API key");
        return Err(AuthError::TokenInvalid.into());
    }

    if payload.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %payload.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = payload.data.user_id.ok_or_else(|| {
        AppError::Validation(ValidationError::EmptyField("data.user_id".to_string()))
    })?;
    store
        .upgrade_user(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))?;

    tracing::info!(user_id = %user_id, "User upgraded");
    Ok(HttpResponse::NoContent().finish())
}
