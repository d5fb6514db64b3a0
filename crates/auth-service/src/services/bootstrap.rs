//! First-run provisioning.

use crate::config::AdminConfig;
use crate::crypto::PasswordHasher;
use crate::errors::AuthError;
use crate::identity::{Principal, UserRole};
use crate::repositories::users;
use secrecy::ExposeSecret;
use sqlx::PgPool;

/// Create the configured admin account if the user table is empty.
///
/// The count and insert run in one transaction so concurrent instances
/// racing at first start cannot both seed an admin. Idempotent on an
/// already-populated database.
pub async fn ensure_admin_user(
    pool: &PgPool,
    hasher: &dyn PasswordHasher,
    admin: &AdminConfig,
) -> Result<(), AuthError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

    if users::count(&mut *tx).await? > 0 {
        tx.rollback()
            .await
            .map_err(|e| AuthError::Database(e.to_string()))?;
        tracing::debug!("user table populated, skipping admin bootstrap");
        return Ok(());
    }

    let password_hash = hasher.hash(admin.password.expose_secret())?;
    let user = users::insert(
        &mut *tx,
        &admin.email,
        &password_hash,
        Some("Administrator"),
        UserRole::Admin,
    )
    .await?;

    tx.commit()
        .await
        .map_err(|e| AuthError::Database(e.to_string()))?;

    let actor = Principal::internal(user.user_id, UserRole::Admin);
    tracing::info!(
        user_id = %actor.user_id,
        email = %admin.email,
        "bootstrap admin account created"
    );
    Ok(())
}
