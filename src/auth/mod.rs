/// Authentication module
///
/// Handles access token issuance/validation, password hashing,
/// refresh token management and credential extraction.

mod claims;
mod extract;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{Claims, ISSUER};
pub use extract::{get_api_key, get_bearer_token};
pub use jwt::{issue_access_token, session_ttl, validate_access_token, MAX_ACCESS_TOKEN_TTL_SECONDS};
pub use password::{hash_password, validate_password_input, verify_password, MAX_PASSWORD_BYTES};
pub use refresh_token::generate_refresh_token;
pub use refresh_token::resolve_refresh_token;
pub use refresh_token::revoke_refresh_token;
pub use refresh_token::save_refresh_token;
pub use refresh_token::REFRESH_TOKEN_TTL_DAYS;
