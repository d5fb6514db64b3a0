//! Session lifecycle: login, refresh, and revocation.

use crate::crypto::tokens::{TokenCodec, TokenType};
use crate::crypto::PasswordHasher;
use crate::errors::AuthError;
use crate::identity::Principal;
use crate::models::RefreshSession;
use crate::repositories::{RefreshSessionStore, UserStore};
use chrono::Utc;
use std::sync::Arc;

/// Both credentials minted by a successful login.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn RefreshSessionStore>,
    codec: Arc<dyn TokenCodec>,
    hasher: Arc<dyn PasswordHasher>,
    dummy_password_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn RefreshSessionStore>,
        codec: Arc<dyn TokenCodec>,
        hasher: Arc<dyn PasswordHasher>,
        dummy_password_hash: String,
    ) -> Self {
        Self {
            users,
            sessions,
            codec,
            hasher,
            dummy_password_hash,
        }
    }

    /// Verify a password credential and open a new refresh session.
    ///
    /// The password digest is verified exactly once per attempt, against the
    /// stored digest when the email is known and against a fixed dummy
    /// digest when it is not, so response timing does not reveal which
    /// emails exist. Only after verification does the outcome branch.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionTokens, AuthError> {
        let user = self.users.get_by_email(email).await?;

        let digest = user
            .as_ref()
            .map(|u| u.password_hash.as_str())
            .unwrap_or(self.dummy_password_hash.as_str());
        let password_ok = self.hasher.verify(password, digest)?;

        let user = match (user, password_ok) {
            (Some(user), true) => user,
            _ => {
                tracing::info!(email = %email, "login rejected");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let refresh = self.codec.issue_refresh_token(user.user_id, user.role)?;
        let session = RefreshSession {
            session_id: refresh.session_id,
            user_id: user.user_id,
            issued_at: refresh.issued_at,
            expires_at: refresh.expires_at,
            revoked_at: None,
        };
        // The session row must exist before any credential bound to it goes
        // out the door. If the write fails, the login fails.
        self.sessions.create(&session).await?;

        let access = self
            .codec
            .issue_access_token(user.user_id, user.role, refresh.session_id)?;

        tracing::info!(
            user_id = %user.user_id,
            session_id = %refresh.session_id,
            "login succeeded"
        );

        Ok(SessionTokens {
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }

    /// Exchange a live refresh token for a fresh access token.
    ///
    /// The user is re-fetched so the new token carries their current role,
    /// and the session row is re-checked so revocation and expiry take
    /// effect immediately.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let principal = self.codec.verify(refresh_token, TokenType::Refresh)?;
        let session_id = principal.session_id.ok_or(AuthError::InvalidToken)?;

        let user = self
            .users
            .get_by_id(principal.user_id)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let session = self
            .sessions
            .get_by_session_id(session_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        if !session.is_active(Utc::now()) {
            return Err(AuthError::InvalidToken);
        }

        let access = self
            .codec
            .issue_access_token(user.user_id, user.role, session_id)?;

        tracing::debug!(user_id = %user.user_id, session_id = %session_id, "access token refreshed");
        Ok(access.token)
    }

    /// Terminate the session behind the presented credential.
    pub async fn logout(&self, principal: &Principal) -> Result<(), AuthError> {
        let session_id = principal
            .logout_target()
            .ok_or(AuthError::Unauthenticated("No session to terminate"))?;

        self.sessions.revoke_by_session_id(session_id).await?;
        tracing::info!(user_id = %principal.user_id, session_id = %session_id, "session revoked");
        Ok(())
    }

    /// Terminate every session the user holds, on any device.
    pub async fn logout_all(&self, principal: &Principal) -> Result<(), AuthError> {
        let revoked = self
            .sessions
            .revoke_all_by_user_id(principal.user_id)
            .await?;
        tracing::info!(user_id = %principal.user_id, revoked, "all sessions revoked");
        Ok(())
    }
}

