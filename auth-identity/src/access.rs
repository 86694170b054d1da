//! Per-route access rules.
//!
//! Authorization is a pure decision over the verified caller identity and
//! the rule the route declares; it never reads storage.

use crate::models::Identity;
use thiserror::Error;
use uuid::Uuid;

/// Rule a route applies to an authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Caller must be the target user or an admin
    SelfOrAdmin(Uuid),
    /// Caller must be an admin
    AdminOnly,
    /// No check
    Public,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("access denied: {reason}")]
pub struct AccessDenied {
    pub reason: &'static str,
}

pub fn authorize(identity: &Identity, rule: &AccessRule) -> Result<(), AccessDenied> {
    match rule {
        AccessRule::Public => Ok(()),
        AccessRule::AdminOnly if identity.is_admin() => Ok(()),
        AccessRule::AdminOnly => Err(AccessDenied {
            reason: "admin role required",
        }),
        AccessRule::SelfOrAdmin(target) if identity.is_admin() || identity.user_id == *target => {
            Ok(())
        }
        AccessRule::SelfOrAdmin(_) => Err(AccessDenied {
            reason: "resource belongs to another user",
        }),
    }
}
