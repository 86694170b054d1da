use secrecy::SecretString;
use std::time::Duration;

/// Secret used when none is configured outside production.
///
/// Tokens signed with it are forgeable by anyone who has read this file.
pub const INSECURE_DEV_SECRET: &str = "vitalwatch-insecure-development-secret";

/// Lowest bcrypt cost accepted in production
pub const MIN_PRODUCTION_BCRYPT_COST: u32 = 10;

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub jwt_secret: SecretString,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    pub hash_timeout: Duration,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(INSECURE_DEV_SECRET.to_string()),
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            bcrypt_cost: MIN_PRODUCTION_BCRYPT_COST,
            hash_timeout: Duration::from_secs(5),
        }
    }
}
