use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::ProviderConfig;
use crate::error::{AppError, AppResult};

const YANDEX_PROVIDER: &str = "yandex";

/// Identity asserted by a federated provider after verifying its token.
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    pub email: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Maps a provider-issued OAuth token to the verified identity behind it.
    async fn resolve_identity(&self, provider_token: &str) -> AppResult<ProviderIdentity>;
}

pub struct DisabledIdentityProvider;

#[async_trait]
impl IdentityProvider for DisabledIdentityProvider {
    async fn resolve_identity(&self, _provider_token: &str) -> AppResult<ProviderIdentity> {
        Err(AppError::BadRequest(
            "identity provider is not configured".to_string(),
        ))
    }
}

/// Client for the Yandex login info endpoint. The endpoint answers
/// `GET {identity_url}?format=json&oauth_token=...` with a profile document
/// whose `default_email` field is the verified address.
pub struct YandexIdentityProvider {
    client: Client,
    identity_url: String,
    retry_on_timeout: bool,
}

#[derive(Deserialize)]
struct YandexUserInfo {
    default_email: Option<String>,
}

#[derive(Debug, Error)]
enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("identity endpoint returned {0}")]
    Status(reqwest::StatusCode),

    #[error("identity response failed to parse: {0}")]
    Malformed(reqwest::Error),

    #[error("identity response did not include a verified email")]
    MissingEmail,
}

impl FetchFailure {
    fn is_retryable(&self) -> bool {
        matches!(self, FetchFailure::Transport(e) if e.is_timeout() || e.is_connect())
    }

    fn into_app_error(self) -> AppError {
        AppError::AdapterError {
            provider: YANDEX_PROVIDER.to_string(),
            message: self.to_string(),
        }
    }
}

impl YandexIdentityProvider {
    pub fn new(config: &ProviderConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("failed to build identity client: {e}"))
            })?;

        Ok(Self {
            client,
            identity_url: config.identity_url.clone(),
            retry_on_timeout: config.retry_on_timeout,
        })
    }

    async fn fetch_identity(&self, provider_token: &str) -> Result<ProviderIdentity, FetchFailure> {
        let response = self
            .client
            .get(&self.identity_url)
            .query(&[("format", "json"), ("oauth_token", provider_token)])
            .send()
            .await
            .map_err(FetchFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status));
        }

        let info: YandexUserInfo = response.json().await.map_err(FetchFailure::Malformed)?;
        let email = info
            .default_email
            .filter(|email| !email.trim().is_empty())
            .ok_or(FetchFailure::MissingEmail)?;

        Ok(ProviderIdentity { email })
    }
}

#[async_trait]
impl IdentityProvider for YandexIdentityProvider {
    async fn resolve_identity(&self, provider_token: &str) -> AppResult<ProviderIdentity> {
        let mut remaining: u32 = if self.retry_on_timeout { 2 } else { 1 };

        loop {
            remaining -= 1;
            match self.fetch_identity(provider_token).await {
                Ok(identity) => return Ok(identity),
                Err(failure) if remaining > 0 && failure.is_retryable() => {
                    warn!(
                        provider = YANDEX_PROVIDER,
                        error = %failure,
                        "identity request timed out, retrying once"
                    );
                }
                Err(failure) => {
                    // Full detail stays server-side; callers surface a plain 401.
                    error!(
                        provider = YANDEX_PROVIDER,
                        error = %failure,
                        "identity resolution failed"
                    );
                    return Err(failure.into_app_error());
                }
            }
        }
    }
}
