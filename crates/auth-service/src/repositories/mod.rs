//! Database access layer.
//!
//! Query functions are generic over [`sqlx::PgExecutor`] so the same SQL
//! runs against a pool or inside an open transaction. The store traits are
//! the seam the service layer depends on; tests substitute in-memory
//! implementations.

pub mod refresh_sessions;
pub mod users;

use crate::errors::AuthError;
use crate::models::{RefreshSession, User};
use async_trait::async_trait;
use uuid::Uuid;

fn db_err(e: sqlx::Error) -> AuthError {
    AuthError::Database(e.to_string())
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>, AuthError>;
}

#[async_trait]
pub trait RefreshSessionStore: Send + Sync {
    async fn create(&self, session: &RefreshSession) -> Result<(), AuthError>;
    async fn get_by_session_id(
        &self,
        session_id: Uuid,
    ) -> Result<Option<RefreshSession>, AuthError>;

    /// Revoke one session. Idempotent: an already-revoked session keeps its
    /// original `revoked_at`.
    async fn revoke_by_session_id(&self, session_id: Uuid) -> Result<(), AuthError>;

    /// Revoke every unrevoked session belonging to a user. Returns the
    /// number of sessions newly revoked.
    async fn revoke_all_by_user_id(&self, user_id: Uuid) -> Result<u64, AuthError>;
}
