use super::{db_err, RefreshSessionStore};
use crate::errors::AuthError;
use crate::models::RefreshSession;
use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const SESSION_COLUMNS: &str = "session_id, user_id, issued_at, expires_at, revoked_at";

pub async fn insert(
    executor: impl PgExecutor<'_>,
    session: &RefreshSession,
) -> Result<(), AuthError> {
    sqlx::query(
        "INSERT INTO refresh_sessions (session_id, user_id, issued_at, expires_at) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(session.session_id)
    .bind(session.user_id)
    .bind(session.issued_at)
    .bind(session.expires_at)
    .execute(executor)
    .await
    .map_err(db_err)?;
    Ok(())
}

pub async fn get_by_session_id(
    executor: impl PgExecutor<'_>,
    session_id: Uuid,
) -> Result<Option<RefreshSession>, AuthError> {
    sqlx::query_as::<_, RefreshSession>(&format!(
        "SELECT {SESSION_COLUMNS} FROM refresh_sessions WHERE session_id = $1"
    ))
    .bind(session_id)
    .fetch_optional(executor)
    .await
    .map_err(db_err)
}

/// The `revoked_at IS NULL` guard makes revocation idempotent: replays
/// match zero rows and the original revocation timestamp survives.
pub async fn revoke_by_session_id(
    executor: impl PgExecutor<'_>,
    session_id: Uuid,
) -> Result<u64, AuthError> {
    let result = sqlx::query(
        "UPDATE refresh_sessions SET revoked_at = NOW() \
         WHERE session_id = $1 AND revoked_at IS NULL",
    )
    .bind(session_id)
    .execute(executor)
    .await
    .map_err(db_err)?;
    Ok(result.rows_affected())
}

pub async fn revoke_all_by_user_id(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<u64, AuthError> {
    let result = sqlx::query(
        "UPDATE refresh_sessions SET revoked_at = NOW() \
         WHERE user_id = $1 AND revoked_at IS NULL",
    )
    .bind(user_id)
    .execute(executor)
    .await
    .map_err(db_err)?;
    Ok(result.rows_affected())
}

/// Pool-backed [`RefreshSessionStore`].
pub struct PgRefreshSessionStore {
    pool: PgPool,
}

impl PgRefreshSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshSessionStore for PgRefreshSessionStore {
    async fn create(&self, session: &RefreshSession) -> Result<(), AuthError> {
        insert(&self.pool, session).await
    }

    async fn get_by_session_id(
        &self,
        session_id: Uuid,
    ) -> Result<Option<RefreshSession>, AuthError> {
        get_by_session_id(&self.pool, session_id).await
    }

    async fn revoke_by_session_id(&self, session_id: Uuid) -> Result<(), AuthError> {
        revoke_by_session_id(&self.pool, session_id).await?;
        Ok(())
    }

    async fn revoke_all_by_user_id(&self, user_id: Uuid) -> Result<u64, AuthError> {
        revoke_all_by_user_id(&self.pool, user_id).await
    }
}
