//! Authentication context extraction
//!
//! Handlers take [`AuthContext`] (any authenticated caller) or
//! [`AdminContext`] (admins only) as arguments. Both are resolved from the
//! `Authorization: Bearer <token>` header before the body is read, so a
//! rejected request never reaches storage.

use crate::error::ApiError;
use crate::server::AppState;
use async_trait::async_trait;
use auth_identity::{authorize, AccessRule, Identity, Role, TokenService};
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use uuid::Uuid;

/// Verified caller identity, valid for the current request only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub identity: Identity,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.identity.user_id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    pub fn is_admin(&self) -> bool {
        self.identity.is_admin()
    }

    /// Apply a route's access rule to this caller
    pub fn authorize(&self, rule: AccessRule) -> Result<(), ApiError> {
        authorize(&self.identity, &rule).map_err(ApiError::from)
    }

    /// Caller must be `target` or an admin
    pub fn require_self_or_admin(&self, target: Uuid) -> Result<(), ApiError> {
        self.authorize(AccessRule::SelfOrAdmin(target))
    }
}

/// Caller verified to hold the admin role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminContext(pub AuthContext);

/// Pull the token out of a `Bearer` authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthenticated("Malformed Authorization header"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| ApiError::unauthenticated("Expected: Authorization: Bearer <token>"))?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(ApiError::unauthenticated("Expected: Authorization: Bearer <token>"));
    }

    Ok(token)
}

/// Verify the request's bearer token
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthContext, ApiError> {
    let token = extract_bearer_token(headers)?;
    let identity = tokens.verify(token)?;
    Ok(AuthContext { identity })
}

#[async_trait]
impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, &state.tokens)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ctx = authenticate(&parts.headers, &state.tokens)?;
        ctx.authorize(AccessRule::AdminOnly)?;
        Ok(AdminContext(ctx))
    }
}
