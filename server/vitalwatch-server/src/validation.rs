//! Request validation utilities for consistent validation across handlers
//!
//! Request types implement [`RequestValidation`]; the macros below return
//! early with an [`ApiError::Validation`](crate::error::ApiError) naming the
//! offending field.

use crate::error::ApiError;

/// Trait for validating request payloads
///
/// # Example
///
/// ```rust
/// use vitalwatch_server::error::ApiError;
/// use vitalwatch_server::validation::RequestValidation;
/// use vitalwatch_server::{validate_email, validate_required};
///
/// struct Invite {
///     email: String,
///     name: String,
/// }
///
/// impl RequestValidation for Invite {
///     fn validate(&self) -> Result<(), ApiError> {
///         validate_required!(self.name, "name", "Name is required");
///         validate_email!(self.email, "email", "Invalid email format");
///         Ok(())
///     }
/// }
///
/// let invite = Invite { email: "nurse@example.com".into(), name: "Asha".into() };
/// assert!(invite.validate().is_ok());
/// ```
pub trait RequestValidation {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Fail with a field error unless `$predicate` holds
#[macro_export]
macro_rules! validate_field {
    ($name:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::field($name, $message));
        }
    };
}

/// Non-empty after trimming
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $name:expr, $message:expr) => {
        $crate::validate_field!($name, !$field.trim().is_empty(), $message);
    };
}

/// Standard email grammar
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $name:expr, $message:expr) => {
        $crate::validate_field!(
            $name,
            $crate::validation::is_valid_email(&$field),
            $message
        );
    };
}

/// Inclusive numeric range
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $name:expr, $min:expr, $max:expr, $message:expr) => {
        $crate::validate_field!($name, ($min..=$max).contains(&$field), $message);
    };
}

pub fn is_valid_email(value: &str) -> bool {
    use validator::ValidateEmail;
    value.validate_email()
}

/// Exactly ten ASCII digits
pub fn is_valid_phone(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}

/// Trimmed, lowercased email used as the uniqueness key
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}
