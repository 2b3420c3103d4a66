pub mod auth_config;
pub mod database_config;
pub mod defaults;
pub mod provider_config;
pub mod security_config;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

pub use auth_config::{AuthConfig, ConfigError};
pub use database_config::DatabaseConfig;
pub use provider_config::ProviderConfig;
pub use security_config::SecurityConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "defaults::default_host")]
    pub host: String,
    #[serde(default = "defaults::default_port")]
    pub port: u16,
    #[serde(default = "defaults::default_environment")]
    pub environment: String,
    /// Base URL of the web client, used for provider-login redirects.
    #[serde(default = "defaults::default_client_url")]
    pub client_url: String,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "defaults::default_logging_level")]
    pub level: String,
    #[serde(default = "defaults::default_logging_json_format")]
    pub json_format: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<figment::Error>> {
        let mut config: Self = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Toml::file("config/development.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .merge(Env::prefixed("DATABASE_").split("__"))
            .merge(Env::prefixed("AUTH_").split("__"))
            .merge(Env::prefixed("PROVIDER_").split("__"))
            .merge(Env::prefixed("SECURITY_").split("__"))
            .merge(Env::prefixed("LOGGING_").split("__"))
            .merge(
                Env::raw()
                    .only(&["database.url"])
                    .map(|_| "DATABASE_URL".into()),
            )
            .merge(
                Env::raw()
                    .only(&["auth.jwt_secret"])
                    .map(|_| "JWT_SECRET".into()),
            )
            .merge(Env::raw().only(&["client_url"]).map(|_| "CLIENT_URL".into()))
            .merge(
                Env::raw()
                    .only(&["provider.identity_url"])
                    .map(|_| "PROVIDER_IDENTITY_URL".into()),
            )
            .extract()
            .map_err(Box::new)?;

        config.security.metrics_admin_token =
            defaults::normalize_optional_string(config.security.metrics_admin_token);

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt_secret = self.auth.jwt_secret.trim();
        if jwt_secret.is_empty() {
            return Err(ConfigError::AuthConfig(
                "JWT_SECRET must be set via environment variable".to_string(),
            ));
        }

        // Reject the insecure default placeholder (trim to catch spaces around it)
        if jwt_secret == "change-me-in-production" {
            return Err(ConfigError::AuthConfig(
                "JWT_SECRET must be set to a secure value, not the default placeholder".to_string(),
            ));
        }

        // A short signing key is tolerable while hacking locally, never in a
        // deployed environment.
        if self.environment != "development" && jwt_secret.len() < 32 {
            return Err(ConfigError::AuthConfig(
                "JWT_SECRET must be at least 32 bytes outside development".to_string(),
            ));
        }

        self.provider.validate()
    }
}
