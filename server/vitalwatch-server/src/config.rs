//! Server configuration
//!
//! Values are layered: built-in defaults, then an optional config file, then
//! `VITALWATCH_`-prefixed environment variables (e.g. `VITALWATCH_JWT_SECRET`;
//! nested keys use `__`, e.g. `VITALWATCH_INSIGHT__API_KEY`).

use auth_identity::{IdentityConfig, INSECURE_DEV_SECRET, MIN_PRODUCTION_BCRYPT_COST};
use error_common::{Result, VitalWatchError};
use insight_service::InsightConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Token signing secret. Required in production.
    pub jwt_secret: Option<SecretString>,
    pub token_ttl_hours: u64,
    pub bcrypt_cost: u32,
    pub hash_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    /// Empty allows any origin
    pub cors_origins: Vec<String>,
    /// PostgreSQL store when set, in-memory store otherwise
    pub database_url: Option<SecretString>,
    pub database_max_connections: u32,
    pub insight: InsightConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: None,
            token_ttl_hours: 7 * 24,
            bcrypt_cost: MIN_PRODUCTION_BCRYPT_COST,
            hash_timeout_secs: 5,
            request_timeout_secs: 30,
            shutdown_grace_secs: 10,
            cors_origins: Vec::new(),
            database_url: None,
            database_max_connections: 20,
            insight: InsightConfig::default(),
        }
    }
}

/// `VITALWATCH_JWT_SECRET`, `VITALWATCH_INSIGHT__API_KEY`, ...
fn environment_source() -> config::Environment {
    config::Environment::with_prefix("VITALWATCH")
        .prefix_separator("_")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("cors_origins")
        .try_parsing(true)
}

impl ServerConfig {
    /// Load defaults, then `path` if it exists, then the environment
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with(path, environment_source())
    }

    fn load_with(path: &str, environment: config::Environment) -> Result<Self> {
        config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(environment)
            .build()
            .and_then(|c| c.try_deserialize::<ServerConfig>())
            .map_err(|e| VitalWatchError::ConfigError(e.to_string()))
    }

    /// Refuse configurations that are unsafe for the selected environment
    pub fn validate(&self) -> Result<()> {
        if self.environment.is_production() {
            let has_secret = self
                .jwt_secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().trim().is_empty());
            if !has_secret {
                return Err(VitalWatchError::ConfigError(
                    "VITALWATCH_JWT_SECRET must be set in production".to_string(),
                ));
            }
            if self.bcrypt_cost < MIN_PRODUCTION_BCRYPT_COST {
                return Err(VitalWatchError::ConfigError(format!(
                    "bcrypt_cost must be at least {MIN_PRODUCTION_BCRYPT_COST} in production"
                )));
            }
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(VitalWatchError::ConfigError(format!(
                "bcrypt_cost {} is outside 4..=31",
                self.bcrypt_cost
            )));
        }

        Ok(())
    }

    /// Identity settings, falling back to the insecure development secret
    pub fn identity_config(&self) -> IdentityConfig {
        let jwt_secret = match &self.jwt_secret {
            Some(secret) if !secret.expose_secret().trim().is_empty() => secret.clone(),
            _ => {
                tracing::warn!(
                    "No JWT secret configured; signing tokens with the insecure development default"
                );
                SecretString::new(INSECURE_DEV_SECRET.to_string())
            }
        };

        IdentityConfig {
            jwt_secret,
            token_ttl: Duration::from_secs(self.token_ttl_hours.saturating_mul(3600)),
            bcrypt_cost: self.bcrypt_cost,
            hash_timeout: Duration::from_secs(self.hash_timeout_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_requires_secret() {
        let config = ServerConfig {
            environment: Environment::Production,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(VitalWatchError::ConfigError(_))));

        let blank = ServerConfig {
            environment: Environment::Production,
            jwt_secret: Some(SecretString::new("   ".into())),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn production_rejects_low_bcrypt_cost() {
        let config = ServerConfig {
            environment: Environment::Production,
            jwt_secret: Some(SecretString::new("s3cret".into())),
            bcrypt_cost: 8,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let ok = ServerConfig {
            bcrypt_cost: 10,
            ..config
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn development_falls_back_to_dev_secret() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        let identity = config.identity_config();
        assert_eq!(identity.jwt_secret.expose_secret(), INSECURE_DEV_SECRET);
        assert_eq!(identity.token_ttl, Duration::from_secs(7 * 24 * 3600));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let config = ServerConfig::load("does-not-exist.toml").unwrap();
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn environment_uses_single_underscore_after_prefix() {
        let vars: config::Map<String, String> = [
            ("VITALWATCH_JWT_SECRET", "from-env"),
            ("VITALWATCH_ENVIRONMENT", "production"),
            ("VITALWATCH_INSIGHT__API_KEY", "insight-key"),
            ("VITALWATCH_CORS_ORIGINS", "https://a.example,https://b.example"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config =
            ServerConfig::load_with("does-not-exist.toml", environment_source().source(Some(vars)))
                .unwrap();

        assert_eq!(config.jwt_secret.unwrap().expose_secret(), "from-env");
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.insight.api_key.unwrap().expose_secret(), "insight-key");
        assert_eq!(config.cors_origins.len(), 2);
    }
}
