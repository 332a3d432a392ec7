/// Persistence seam
///
/// Handlers and the session layer only see these traits. `PostgresStore` is
/// the production backend; `InMemoryStore` serves local development and the
/// HTTP test suite. Every method is a single atomic mutation or read.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;

/// Stored user row. Holds the password hash, so it is never serialized.
#[derive(Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_upgraded: bool,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .field("is_upgraded", &self.is_upgraded)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Chirp {
    pub id: Uuid,
    pub body: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A refresh token as persisted: the digest of the raw token, never the
/// raw token itself.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token_hash: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    /// `DatabaseError::UniqueConstraintViolation` if the email is taken
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError>;

    /// Exact, case-sensitive match on the stored email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    /// `None` when the user does not exist
    async fn update_user(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError>;

    /// Set the upgraded flag. `None` when the user does not exist.
    async fn upgrade_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ChirpStore: Send + Sync {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError>;

    /// All chirps, or only those of `author_id`. No ordering guarantee.
    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, AppError>;

    async fn get_chirp(&self, chirp_id: Uuid) -> Result<Option<Chirp>, AppError>;

    /// `false` when nothing was deleted
    async fn delete_chirp(&self, chirp_id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn save_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), AppError>;

    /// Owner of the token if it exists, is not revoked, has not expired at
    /// `now`, and its user still exists. Every other case is `None`.
    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError>;

    /// Mark revoked. Already-revoked or unknown tokens are left untouched.
    /// Returns how many tokens changed state.
    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>;
}

#[async_trait]
pub trait Store: UserStore + ChirpStore + RefreshTokenStore {
    /// Delete every user; chirps and refresh tokens go with them
    async fn reset(&self) -> Result<(), AppError>;
}
