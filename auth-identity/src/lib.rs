//! Identity primitives for the VitalWatch engine
//!
//! This crate provides the pieces every authenticated request depends on:
//! - Password hashing and verification (bcrypt, off the async executor)
//! - Password strength policy
//! - Session token issuance and verification (HS256 JWT)
//! - The access-rule decision function used by the HTTP extractors
//!
//! Nothing in here touches storage.
//!
//! # Example
//!
//! ```rust
//! use auth_identity::{authorize, AccessRule, Identity, Role};
//! use uuid::Uuid;
//!
//! let me = Uuid::new_v4();
//! let caller = Identity { user_id: me, role: Role::Patient };
//!
//! assert!(authorize(&caller, &AccessRule::SelfOrAdmin(me)).is_ok());
//! assert!(authorize(&caller, &AccessRule::AdminOnly).is_err());
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod models;
pub mod password;
pub mod token;

pub use access::*;
pub use config::*;
pub use error::*;
pub use models::*;
pub use password::*;
pub use token::*;
