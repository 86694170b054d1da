//! Common error handling utilities for the VitalWatch engine
//!
//! This crate holds the pieces of error handling shared by every workspace
//! member:
//!
//! - **Process-level errors**: [`VitalWatchError`] for startup, configuration
//!   and server lifecycle failures that end the process.
//! - **Error codes**: stable, machine-readable codes attached to every API
//!   error response so clients can branch without parsing messages.
//!
//! # Example
//!
//! ```rust
//! use error_common::{codes, VitalWatchError};
//!
//! fn require_secret(secret: Option<&str>) -> error_common::Result<&str> {
//!     secret.ok_or_else(|| VitalWatchError::ConfigError("JWT secret is not set".to_string()))
//! }
//!
//! assert!(require_secret(None).is_err());
//! assert_eq!(codes::authentication::INVALID_CREDENTIALS, "AUTH_2001");
//! ```

pub mod codes;
pub mod types;

pub use types::*;
