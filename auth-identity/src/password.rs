use crate::config::IdentityConfig;
use crate::error::{IdentityError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

/// Password used to build the hash compared against on unknown-email logins
const DUMMY_PASSWORD: &str = "vitalwatch-dummy-password-for-timing";

/// bcrypt hashing and verification.
///
/// Both operations are CPU-bound, so they run on the blocking pool and are
/// bounded by `hash_timeout`.
#[derive(Clone)]
pub struct PasswordService {
    cost: u32,
    timeout: Duration,
    dummy_hash: Arc<OnceCell<String>>,
}

impl PasswordService {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            cost: config.bcrypt_cost,
            timeout: config.hash_timeout,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Hash a password with a fresh random salt
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.cost;

        let task = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(hash))) => Ok(hash),
            Ok(Ok(Err(e))) => Err(IdentityError::HashingError(e.to_string())),
            Ok(Err(join)) => Err(IdentityError::HashingError(format!(
                "hashing task failed: {join}"
            ))),
            Err(_) => Err(IdentityError::HashingTimeout),
        }
    }

    /// Check a password against a stored hash.
    ///
    /// Malformed hashes, task failures and timeouts all read as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> bool {
        let password = password.to_string();
        let hash = hash.to_string();

        let task =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false));

        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "Password verification timed out"
                );
                false
            }
        }
    }

    /// Spend one verification's worth of work on a fixed hash so that
    /// lookups for unknown accounts take as long as real ones.
    pub async fn verify_dummy(&self, password: &str) {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hash(DUMMY_PASSWORD))
            .await;

        match dummy {
            Ok(hash) => {
                let _ = self.verify(password, hash).await;
            }
            Err(e) => tracing::warn!(error = %e, "Could not prepare dummy hash"),
        }
    }
}

/// Enforce the password policy: at least 8 characters with an uppercase
/// letter, a lowercase letter, a digit and a symbol.
pub fn validate_password_strength(password: &str) -> Result<()> {
    let mut missing = Vec::new();

    if password.chars().count() < 8 {
        missing.push("at least 8 characters");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        missing.push("an uppercase letter");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        missing.push("a lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit");
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        missing.push("a symbol");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IdentityError::WeakPassword(format!(
            "password must contain {}",
            missing.join(", ")
        )))
    }
}
