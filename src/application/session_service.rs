use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::api::dtos::{LoginRequest, RegisterRequest};
use crate::config::AuthConfig;
use crate::domain::{Provider, RefreshToken, User};
use crate::error::{AppError, AppResult};
use crate::infrastructure::provider::{DisabledIdentityProvider, IdentityProvider};
use crate::infrastructure::repositories::RefreshTokenRepository;
use crate::utils::hash::{hash_refresh_token, verify_password};
use crate::utils::jwt::create_access_token;

use super::user_directory::{UpsertUser, UserDirectory};

#[derive(Clone)]
pub struct SessionService {
    directory: Arc<UserDirectory>,
    token_repo: Arc<dyn RefreshTokenRepository>,
    config: AuthConfig,
    identity_provider: Arc<dyn IdentityProvider>,
}

/// Credentials issued for one device session. The raw refresh token exists
/// only here and in the client cookie; the store keeps its digest.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

impl SessionService {
    pub fn new(
        directory: Arc<UserDirectory>,
        token_repo: Arc<dyn RefreshTokenRepository>,
        config: AuthConfig,
    ) -> Self {
        Self {
            directory,
            token_repo,
            config,
            identity_provider: Arc::new(DisabledIdentityProvider),
        }
    }

    pub fn with_identity_provider(mut self, identity_provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = identity_provider;
        self
    }

    /// Creates a password account. No tokens are issued; the client logs in
    /// afterwards.
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        if self.directory.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let user = self
            .directory
            .upsert(UpsertUser {
                email: Some(email),
                password: Some(request.password),
                ..UpsertUser::default()
            })
            .await?;

        info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Verifies the password and opens a session for the calling device.
    /// Accounts without a stored hash are provider-only and never match.
    pub async fn login(&self, request: LoginRequest, user_agent: &str) -> AppResult<TokenPair> {
        request.validate()?;

        let email = request.email.trim().to_lowercase();
        let user = self
            .directory
            .find_by_email(&email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let hash = user.password_hash.as_deref().ok_or(AppError::Unauthorized)?;
        if !verify_password(&request.password, hash) {
            return Err(AppError::Unauthorized);
        }

        self.issue_token_pair(&user, user_agent).await
    }

    /// Opens a session for an identity already verified by a federated
    /// provider. Unknown emails get a passwordless account; existing
    /// accounts are used as stored, password hash included.
    pub async fn provider_auth(
        &self,
        email: &str,
        user_agent: &str,
        provider: Provider,
    ) -> AppResult<TokenPair> {
        let email = email.trim().to_lowercase();
        let user = match self.directory.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let user = self
                    .directory
                    .upsert(UpsertUser {
                        email: Some(email),
                        provider: Some(provider),
                        ..UpsertUser::default()
                    })
                    .await?;
                info!(user_id = %user.id, ?provider, "provider account created");
                user
            }
        };

        self.issue_token_pair(&user, user_agent).await
    }

    /// Full federated login: the provider token is resolved to an email
    /// through the configured identity endpoint first.
    pub async fn provider_login(
        &self,
        provider: Provider,
        provider_token: &str,
        user_agent: &str,
    ) -> AppResult<TokenPair> {
        let identity = self.identity_provider.resolve_identity(provider_token).await?;
        self.provider_auth(&identity.email, user_agent, provider).await
    }

    /// Rotates a refresh token. Claiming deletes the stored record, so a
    /// replayed token finds nothing and fails exactly like a forged one.
    pub async fn refresh_tokens(
        &self,
        refresh_token: &str,
        user_agent: &str,
    ) -> AppResult<TokenPair> {
        let token_hash = hash_refresh_token(refresh_token);
        let stored = self
            .token_repo
            .delete_by_token(&token_hash)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if stored.expires_at <= Utc::now() {
            return Err(AppError::Unauthorized);
        }

        let user = self
            .directory
            .find_by_id(stored.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if stored.user_agent != user_agent {
            warn!(
                user_id = %user.id,
                "refresh token presented from a different device fingerprint"
            );
        }

        self.issue_token_pair(&user, user_agent).await
    }

    /// Revokes the session behind the given refresh token. Idempotent: a
    /// token that is already gone is not an error.
    pub async fn delete_refresh_token(&self, refresh_token: &str) -> AppResult<()> {
        let token_hash = hash_refresh_token(refresh_token);
        self.token_repo.delete_by_token(&token_hash).await?;
        Ok(())
    }

    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        self.delete_refresh_token(refresh_token).await
    }

    pub fn refresh_expiry(&self) -> Duration {
        Duration::days(self.config.refresh_token_expiration_days as i64)
    }

    async fn issue_token_pair(&self, user: &User, user_agent: &str) -> AppResult<TokenPair> {
        let raw_refresh_token = format!("{}.{}", Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        let record = RefreshToken {
            token_hash: hash_refresh_token(&raw_refresh_token),
            user_id: user.id,
            user_agent: user_agent.to_string(),
            expires_at: now + self.refresh_expiry(),
            created_at: now,
        };
        let record = self.token_repo.upsert(&record).await?;

        let access_token = create_access_token(user.id, &user.roles, &self.config)?;
        Ok(TokenPair {
            access_token,
            refresh_token: raw_refresh_token,
            refresh_expires_at: record.expires_at,
        })
    }
}
