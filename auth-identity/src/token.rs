//! Session Token Service
//!
//! Issues and verifies HS256-signed JWTs asserting `{userId, role}`.

use crate::config::IdentityConfig;
use crate::error::{IdentityError, Result};
use crate::models::{Claims, Identity, Role};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use std::time::Duration;
use uuid::Uuid;

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &IdentityConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: config.token_ttl,
        }
    }

    /// Issue a token valid from now until now + ttl
    pub fn issue(&self, user_id: Uuid, role: Role) -> Result<String> {
        self.issue_at(user_id, role, Utc::now())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn issue_at(&self, user_id: Uuid, role: Role, issued_at: DateTime<Utc>) -> Result<String> {
        let iat = issued_at.timestamp();
        let ttl = i64::try_from(self.ttl.as_secs())
            .map_err(|_| IdentityError::JwtError("token ttl out of range".to_string()))?;

        let claims = Claims {
            user_id,
            role,
            iat,
            exp: iat.saturating_add(ttl),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| IdentityError::JwtError(e.to_string()))
    }

    /// Verify signature, structure and expiry
    pub fn verify(&self, token: &str) -> Result<Identity> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| Identity::from(data.claims))
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                IdentityError::InvalidToken
            })
    }
}
