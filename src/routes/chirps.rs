/// Chirp Routes

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chirps::{moderate, sort_chirps, SortDirection};
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::middleware::AuthenticatedUser;
use crate::store::{Chirp, ChirpStore, Store};

#[derive(Deserialize)]
pub struct NewChirp {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: String,
    pub user_id: Uuid,
}

impl From<Chirp> for ChirpResponse {
    fn from(chirp: Chirp) -> Self {
        Self {
            id: chirp.id,
            created_at: chirp.created_at,
            updated_at: chirp.updated_at,
            body: chirp.body,
            user_id: chirp.user_id,
        }
    }
}

fn parse_uuid(field: &str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation(ValidationError::InvalidFormat(field.to_string())))
}

/// POST /api/chirps
///
/// The owner is always the authenticated caller.
///
/// # Errors
/// - 400: body over 140 characters
/// - 401: missing or invalid access token
pub async fn create_chirp(
    caller: AuthenticatedUser,
    form: web::Json<NewChirp>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_creation").with_user_id(caller.0.id);

    let body = moderate(&form.body)?;
    let chirp = store.create_chirp(caller.0.id, &body).await?;

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        user_id = %chirp.user_id,
        chirp_id = %chirp.id,
        "Chirp created"
    );
    Ok(HttpResponse::Created().json(ChirpResponse::from(chirp)))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
///
/// Oldest first unless `sort=desc`.
///
/// # Errors
/// - 400: `author_id` is not a UUID
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let author_id = query
        .author_id
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_uuid("author_id", raw))
        .transpose()?;
    let direction = query
        .sort
        .as_deref()
        .and_then(|raw| raw.parse::<SortDirection>().ok())
        .unwrap_or_default();

    let mut chirps = store.list_chirps(author_id).await?;
    sort_chirps(&mut chirps, direction);

    let response: Vec<ChirpResponse> = chirps.into_iter().map(ChirpResponse::from).collect();
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/chirps/{chirp_id}
///
/// # Errors
/// - 400: malformed id
/// - 404: no such chirp
pub async fn get_chirp(
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_uuid("chirp_id", &path.into_inner())?;

    let chirp = store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::not_found("chirp"))?;

    Ok(HttpResponse::Ok().json(ChirpResponse::from(chirp)))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 400: malformed id
/// - 401: missing or invalid access token
/// - 403: caller does not own the chirp
/// - 404: no such chirp
pub async fn delete_chirp(
    caller: AuthenticatedUser,
    path: web::Path<String>,
    store: web::Data<dyn Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_deletion").with_user_id(caller.0.id);
    let chirp_id = parse_uuid("chirp_id", &path.into_inner())?;

    let chirp = store
        .get_chirp(chirp_id)
        .await?
        .ok_or_else(|| AppError::not_found("chirp"))?;

    if chirp.user_id != caller.0.id {
        tracing::warn!(
            request_id = %context.request_id,
            operation = %context.operation,
            user_id = %caller.0.id,
            chirp_id = %chirp_id,
            "Attempt to delete another user's chirp"
        );
        return Err(AuthError::PermissionDenied.into());
    }

    if !store.delete_chirp(chirp_id).await? {
        // Deleted concurrently between lookup and delete
        return Err(AppError::not_found("chirp"));
    }

    tracing::info!(
        request_id = %context.request_id,
        operation = %context.operation,
        chirp_id = %chirp_id,
        "Chirp deleted"
    );
    Ok(HttpResponse::NoContent().finish())
}
