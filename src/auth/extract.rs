/// Credential extraction from request headers

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

/// Token from `Authorization: Bearer <token>`
pub fn get_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    scheme_value(headers, BEARER_PREFIX)
}

/// Key from `Authorization: ApiKey <key>`
pub fn get_api_key(headers: &HeaderMap) -> Result<&str, AuthError> {
    scheme_value(headers, API_KEY_PREFIX)
}

fn scheme_value<'a>(headers: &'a HeaderMap, prefix: &str) -> Result<&'a str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let credential = value
        .strip_prefix(prefix)
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;

    if credential.is_empty() {
        return Err(AuthError::MissingToken);
    }

    Ok(credential)
}
