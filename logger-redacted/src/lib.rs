pub mod config;
pub mod redactor;

pub use config::*;
pub use redactor::*;

/// PII redaction for log output
///
/// Patient contact details and credentials must never reach log sinks in
/// clear text. Every string that may carry user input is passed through a
/// [`PiiRedactor`] before it is handed to `tracing`.
///
/// # Detected Data Types
///
/// - **Email Addresses**: `john@example.com` → `EMAIL[3q2+7w==]` (hashed for correlation)
/// - **Phone Numbers**: `9876543210` → `PHONE[...]`
/// - **Bearer Tokens**: `Bearer eyJ...` → `Bearer [REDACTED]`
///
/// # Example
///
/// ```rust
/// use logger_redacted::redact;
///
/// let line = redact("login attempt for john.doe@example.com");
/// assert!(!line.contains("john.doe@example.com"));
/// ```
pub fn redact(text: &str) -> String {
    DEFAULT_REDACTOR.redact(text)
}

lazy_static::lazy_static! {
    static ref DEFAULT_REDACTOR: PiiRedactor = PiiRedactor::new(RedactionConfig::default());
}
