use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Provider, Role, User, UserPatch};
use crate::error::{AppError, AppResult};
use crate::infrastructure::repositories::{RefreshTokenRepository, UserRepository};
use crate::utils::hash::hash_password;

/// Partial user write. Absent fields keep their stored values, so a
/// provider-initiated upsert never clears an existing password hash.
#[derive(Debug, Clone, Default)]
pub struct UpsertUser {
    pub email: Option<String>,
    pub password: Option<String>,
    pub provider: Option<Provider>,
    pub roles: Option<Vec<Role>>,
}

/// Read-through user lookup with an in-memory cache in front of the store.
///
/// Entries live for one access-token lifetime and are keyed under both the
/// user id and the email, so either identifier hits the same cached record.
/// Writes go to the store first; the cache is only touched after the store
/// has committed.
#[derive(Clone)]
pub struct UserDirectory {
    user_repo: Arc<dyn UserRepository>,
    token_repo: Arc<dyn RefreshTokenRepository>,
    cache: Cache<String, User>,
}

impl UserDirectory {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        token_repo: Arc<dyn RefreshTokenRepository>,
        cache_ttl_seconds: u64,
    ) -> Self {
        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(cache_ttl_seconds.max(1)))
            .max_capacity(10_000)
            .build();

        Self {
            user_repo,
            token_repo,
            cache,
        }
    }

    /// Looks up a user by id or email, serving the cached record while it
    /// is still fresh.
    pub async fn find(&self, identifier: &str) -> AppResult<Option<User>> {
        if let Some(user) = self.cache.get(identifier).await {
            return Ok(Some(user));
        }

        let Some(user) = self.user_repo.find_by_id_or_email(identifier).await? else {
            return Ok(None);
        };

        self.cache_user(&user).await;
        Ok(Some(user))
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.find(&id.to_string()).await
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find(email).await
    }

    /// Reads through to the store, replacing whatever the cache holds for
    /// this identifier.
    pub async fn force_refresh(&self, identifier: &str) -> AppResult<Option<User>> {
        match self.user_repo.find_by_id_or_email(identifier).await? {
            Some(user) => {
                self.cache_user(&user).await;
                Ok(Some(user))
            }
            None => {
                self.cache.invalidate(identifier).await;
                Ok(None)
            }
        }
    }

    /// Creates or updates the user addressed by email. The returned record
    /// reflects the store after the write and is cached under both keys.
    pub async fn upsert(&self, request: UpsertUser) -> AppResult<User> {
        let email = request
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .ok_or_else(|| AppError::validation_error("email is required"))?
            .to_lowercase();

        let password_hash = match request.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let patch = UserPatch {
            password_hash,
            provider: request.provider,
            roles: request.roles,
        };

        let user = self.user_repo.upsert_by_email(&email, &patch).await?;
        self.cache_user(&user).await;
        Ok(user)
    }

    /// Removes the user and every refresh token they hold. The cache is
    /// dropped before the store delete so no stale record can be served
    /// after the row is gone.
    pub async fn delete(&self, id: Uuid) -> AppResult<Uuid> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

        self.cache.invalidate(&user.id.to_string()).await;
        self.cache.invalidate(&user.email).await;

        let revoked = self.token_repo.delete_all_for_user(user.id).await?;
        self.user_repo.delete(user.id).await?;

        info!(user_id = %user.id, revoked_sessions = revoked, "user deleted");
        Ok(user.id)
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.user_repo.list_all().await
    }

    async fn cache_user(&self, user: &User) {
        self.cache.insert(user.id.to_string(), user.clone()).await;
        self.cache.insert(user.email.clone(), user.clone()).await;
    }
}
