use async_trait::async_trait;
use session_backend::error::{AppError, AppResult};
use session_backend::infrastructure::provider::{IdentityProvider, ProviderIdentity};

/// Resolves every provider token to the same fixed email.
pub struct StaticIdentityProvider {
    email: String,
}

impl StaticIdentityProvider {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn resolve_identity(&self, _provider_token: &str) -> AppResult<ProviderIdentity> {
        Ok(ProviderIdentity {
            email: self.email.clone(),
        })
    }
}

/// Rejects every provider token the way an unreachable upstream would.
pub struct FailingIdentityProvider;

#[async_trait]
impl IdentityProvider for FailingIdentityProvider {
    async fn resolve_identity(&self, _provider_token: &str) -> AppResult<ProviderIdentity> {
        Err(AppError::AdapterError {
            provider: "yandex".to_string(),
            message: "identity endpoint unreachable".to_string(),
        })
    }
}
