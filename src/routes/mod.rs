mod admin;
mod auth;
mod chirps;
mod health_check;
mod users;
mod webhooks;

pub use admin::{metrics, reset};
pub use auth::{login, refresh, revoke, LoginRequest, LoginResponse, TokenResponse};
pub use chirps::{create_chirp, delete_chirp, get_chirp, list_chirps, ChirpResponse, NewChirp};
pub use health_check::health_check;
pub use users::{create_user, update_user, UserRequest, UserResponse};
pub use webhooks::{polka_webhook, WebhookData, WebhookEvent, USER_UPGRADED_EVENT};
