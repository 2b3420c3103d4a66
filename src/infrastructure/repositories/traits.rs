use crate::domain::{RefreshToken, User, UserPatch};
use crate::error::AppResult;
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Resolves either a UUID or an email address in a single round trip.
    async fn find_by_id_or_email(&self, identifier: &str) -> AppResult<Option<User>>;

    /// Creates the account when the email is unknown, otherwise applies the
    /// patch to the stored row. `None` patch fields leave stored values
    /// untouched, which is what keeps provider logins from clobbering an
    /// existing password hash.
    async fn upsert_by_email(&self, email: &str, patch: &UserPatch) -> AppResult<User>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    async fn list_all(&self) -> AppResult<Vec<User>>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Stores a token record, replacing any live token for the same
    /// (user_id, user_agent) pair.
    async fn upsert(&self, token: &RefreshToken) -> AppResult<RefreshToken>;

    async fn find_by_token(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    /// Claims and removes a token in one statement. `None` means the digest
    /// was never stored or a concurrent caller already claimed it; both look
    /// the same to the caller.
    async fn delete_by_token(&self, token_hash: &str) -> AppResult<Option<RefreshToken>>;

    /// Revokes every session of one user. Returns the number of removed
    /// records.
    async fn delete_all_for_user(&self, user_id: Uuid) -> AppResult<u64>;
}
