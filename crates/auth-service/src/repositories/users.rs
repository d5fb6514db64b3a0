use super::{db_err, UserStore};
use crate::errors::AuthError;
use crate::identity::UserRole;
use crate::models::User;
use async_trait::async_trait;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "user_id, email, password_hash, display_name, role, created_at, updated_at";

pub async fn get_by_email(
    executor: impl PgExecutor<'_>,
    email: &str,
) -> Result<Option<User>, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(executor)
    .await
    .map_err(db_err)
}

pub async fn get_by_id(
    executor: impl PgExecutor<'_>,
    user_id: Uuid,
) -> Result<Option<User>, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
    .map_err(db_err)
}

pub async fn count(executor: impl PgExecutor<'_>) -> Result<i64, AuthError> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await
        .map_err(db_err)
}

pub async fn insert(
    executor: impl PgExecutor<'_>,
    email: &str,
    password_hash: &str,
    display_name: Option<&str>,
    role: UserRole,
) -> Result<User, AuthError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (email, password_hash, display_name, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {USER_COLUMNS}"
    ))
    .bind(email)
    .bind(password_hash)
    .bind(display_name)
    .bind(role)
    .fetch_one(executor)
    .await
    .map_err(db_err)
}

/// Pool-backed [`UserStore`].
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        get_by_email(&self.pool, email).await
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        get_by_id(&self.pool, user_id).await
    }
}
