use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{Chirp, ChirpStore, RefreshTokenRecord, RefreshTokenStore, Store, User, UserStore};
use crate::error::{AppError, DatabaseError};

struct StoredRefreshToken {
    record: RefreshTokenRecord,
    revoked_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    chirps: HashMap<Uuid, Chirp>,
    refresh_tokens: HashMap<String, StoredRefreshToken>,
}

/// Process-local store with the same contracts as `PostgresStore`.
///
/// One mutex over all tables, so each operation is a single critical
/// section. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, AppError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: now,
            updated_at: now,
            is_upgraded: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.tables()?.users.get(&user_id).cloned())
    }

    async fn update_user(
        &self,
        user_id: Uuid,
        email: &str,
        hashed_password: &str,
    ) -> Result<Option<User>, AppError> {
        let mut tables = self.tables()?;
        if tables
            .users
            .values()
            .any(|u| u.email == email && u.id != user_id)
        {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Email already registered".to_string(),
            )));
        }

        Ok(tables.users.get_mut(&user_id).map(|user| {
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn upgrade_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let mut tables = self.tables()?;
        Ok(tables.users.get_mut(&user_id).map(|user| {
            user.is_upgraded = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

#[async_trait]
impl ChirpStore for InMemoryStore {
    async fn create_chirp(&self, user_id: Uuid, body: &str) -> Result<Chirp, AppError> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::Database(DatabaseError::UnexpectedError(
                "chirp owner does not exist".to_string(),
            )));
        }

        let now = Utc::now();
        let chirp = Chirp {
            id: Uuid::new_v4(),
            body: body.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
        };
        tables.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn list_chirps(&self, author_id: Option<Uuid>) -> Result<Vec<Chirp>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .chirps
            .values()
            .filter(|c| author_id.map_or(true, |author| c.user_id == author))
            .cloned()
            .collect())
    }

    async fn get_chirp(&self, chirp_id: Uuid) -> Result<Option<Chirp>, AppError> {
        Ok(self.tables()?.chirps.get(&chirp_id).cloned())
    }

    async fn delete_chirp(&self, chirp_id: Uuid) -> Result<bool, AppError> {
        Ok(self.tables()?.chirps.remove(&chirp_id).is_some())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryStore {
    async fn save_refresh_token(&self, record: RefreshTokenRecord) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        if tables.refresh_tokens.contains_key(&record.token_hash) {
            return Err(AppError::Database(DatabaseError::UnexpectedError(
                "refresh token collision".to_string(),
            )));
        }
        tables.refresh_tokens.insert(
            record.token_hash.clone(),
            StoredRefreshToken {
                record,
                revoked_at: None,
            },
        );
        Ok(())
    }

    async fn find_active_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, AppError> {
        let tables = self.tables()?;
        Ok(tables
            .refresh_tokens
            .get(token_hash)
            .filter(|t| t.revoked_at.is_none() && t.record.expires_at > now)
            .map(|t| t.record.user_id)
            .filter(|user_id| tables.users.contains_key(user_id)))
    }

    async fn revoke_refresh_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let mut tables = self.tables()?;
        match tables.refresh_tokens.get_mut(token_hash) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(now);
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn reset(&self) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        *tables = Tables::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(user_id: Uuid, hash: &str, expires_in: Duration) -> RefreshTokenRecord {
        RefreshTokenRecord {
            token_hash: hash.to_string(),
            user_id,
            expires_at: Utc::now() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = InMemoryStore::new();
        store.create_user("a@example.com", "h").await.unwrap();

        let err = store.create_user("a@example.com", "h").await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Database(DatabaseError::UniqueConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_sensitive() {
        let store = InMemoryStore::new();
        store.create_user("Walt@example.com", "h").await.unwrap();

        assert!(store.get_user_by_email("Walt@example.com").await.unwrap().is_some());
        assert!(store.get_user_by_email("walt@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_and_upgrade_missing_user() {
        let store = InMemoryStore::new();
        let missing = Uuid::new_v4();

        assert!(store.update_user(missing, "x@example.com", "h").await.unwrap().is_none());
        assert!(store.upgrade_user(missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_chirps_filters_by_author() {
        let store = InMemoryStore::new();
        let alice = store.create_user("alice@example.com", "h").await.unwrap();
        let bob = store.create_user("bob@example.com", "h").await.unwrap();
        store.create_chirp(alice.id, "one").await.unwrap();
        store.create_chirp(alice.id, "two").await.unwrap();
        store.create_chirp(bob.id, "three").await.unwrap();

        assert_eq!(store.list_chirps(None).await.unwrap().len(), 3);
        let bobs = store.list_chirps(Some(bob.id)).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].body, "three");
    }

    #[tokio::test]
    async fn test_refresh_token_lifecycle() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@example.com", "h").await.unwrap();
        store
            .save_refresh_token(token(user.id, "live", Duration::days(60)))
            .await
            .unwrap();
        store
            .save_refresh_token(token(user.id, "stale", Duration::seconds(-1)))
            .await
            .unwrap();

        let now = Utc::now();
        assert_eq!(store.find_active_refresh_token("live", now).await.unwrap(), Some(user.id));
        assert_eq!(store.find_active_refresh_token("stale", now).await.unwrap(), None);
        assert_eq!(store.find_active_refresh_token("unknown", now).await.unwrap(), None);

        assert_eq!(store.revoke_refresh_token("live", now).await.unwrap(), 1);
        assert_eq!(store.revoke_refresh_token("live", now).await.unwrap(), 0);
        assert_eq!(store.revoke_refresh_token("unknown", now).await.unwrap(), 0);
        assert_eq!(store.find_active_refresh_token("live", now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let store = InMemoryStore::new();
        let user = store.create_user("a@example.com", "h").await.unwrap();
        store.create_chirp(user.id, "hello").await.unwrap();
        store
            .save_refresh_token(token(user.id, "t", Duration::days(1)))
            .await
            .unwrap();

        store.reset().await.unwrap();

        assert!(store.get_user(user.id).await.unwrap().is_none());
        assert!(store.list_chirps(None).await.unwrap().is_empty());
        assert_eq!(store.find_active_refresh_token("t", Utc::now()).await.unwrap(), None);
    }
}
