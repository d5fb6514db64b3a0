//! The authenticated identity carried through a request.
//!
//! A `Principal` is produced by token verification (or by internal bootstrap
//! flows) and travels in the request extensions; protected handlers extract
//! it with a typed, non-optional extractor rather than reading ambient state.

use crate::errors::AuthError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether the principal was authenticated by a presented credential or
/// minted by a machine-originated flow. Kept for audit purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    Internal,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: UserRole,
    pub auth_source: AuthSource,
    /// Refresh session this credential belongs to. Set when the principal
    /// was produced from a refresh token.
    pub session_id: Option<Uuid>,
    /// Refresh session that authorized the presented access token.
    pub parent_session_id: Option<Uuid>,
}

impl Principal {
    /// Principal for machine-originated flows (first-run bootstrap).
    pub fn internal(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            auth_source: AuthSource::Internal,
            session_id: None,
            parent_session_id: None,
        }
    }

    /// Authorization check for role-gated operations.
    pub fn require_role(&self, role: UserRole) -> Result<(), AuthError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }

    /// The refresh session a logout should target: the session itself for
    /// refresh-scoped principals, otherwise the session that authorized the
    /// presented access token. The two coincide by construction since access
    /// tokens are always minted bound to the authorizing session.
    pub fn logout_target(&self) -> Option<Uuid> {
        self.session_id.or(self.parent_session_id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AuthError::Unauthenticated("Authentication required"))
    }
}
