use serde::Deserialize;

use super::auth_config::ConfigError;

/// Settings for the federated identity endpoint that maps a provider-issued
/// OAuth token to a verified email.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "crate::config::defaults::default_provider_identity_url")]
    pub identity_url: String,
    #[serde(default = "crate::config::defaults::default_provider_timeout_seconds")]
    pub timeout_seconds: u64,
    /// When set, a request that times out is retried exactly once before the
    /// failure is surfaced.
    #[serde(default = "crate::config::defaults::default_provider_retry_on_timeout")]
    pub retry_on_timeout: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            identity_url: crate::config::defaults::default_provider_identity_url(),
            timeout_seconds: crate::config::defaults::default_provider_timeout_seconds(),
            retry_on_timeout: crate::config::defaults::default_provider_retry_on_timeout(),
        }
    }
}

impl ProviderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_url.trim().is_empty() {
            return Err(ConfigError::ProviderConfig(
                "PROVIDER_IDENTITY_URL must not be empty".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::ProviderConfig(
                "provider timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}
