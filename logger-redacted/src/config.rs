// Redaction configuration
use serde::{Deserialize, Serialize};

/// Which PII classes are redacted and how
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    pub redact_phones: bool,
    pub redact_bearer_tokens: bool,
    /// Replace values with a short stable hash instead of a mask
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            redact_phones: true,
            redact_bearer_tokens: true,
            hash_for_correlation: true,
        }
    }
}
