use crate::hashing::RecordingHasher;
use async_trait::async_trait;
use auth_service::errors::AuthError;
use auth_service::identity::UserRole;
use auth_service::models::{RefreshSession, User};
use auth_service::repositories::{RefreshSessionStore, UserStore};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user whose password verifies under [`RecordingHasher`].
    pub fn add_user(&self, email: &str, password: &str, role: UserRole) -> Uuid {
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        guard(&self.users).insert(
            user_id,
            User {
                user_id,
                email: email.to_string(),
                password_hash: RecordingHasher::digest(password),
                display_name: None,
                role,
                created_at: now,
                updated_at: now,
            },
        );
        user_id
    }

    pub fn remove_user(&self, user_id: Uuid) {
        guard(&self.users).remove(&user_id);
    }

    pub fn set_role(&self, user_id: Uuid, role: UserRole) {
        if let Some(user) = guard(&self.users).get_mut(&user_id) {
            user.role = role;
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(guard(&self.users)
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_by_id(&self, user_id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(guard(&self.users).get(&user_id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryRefreshSessionStore {
    sessions: Mutex<HashMap<Uuid, RefreshSession>>,
    fail_writes: AtomicBool,
}

impl InMemoryRefreshSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, to exercise storage-error paths.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn sessions_for(&self, user_id: Uuid) -> Vec<RefreshSession> {
        guard(&self.sessions)
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    fn check_writable(&self) -> Result<(), AuthError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(AuthError::Database("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RefreshSessionStore for InMemoryRefreshSessionStore {
    async fn create(&self, session: &RefreshSession) -> Result<(), AuthError> {
        self.check_writable()?;
        guard(&self.sessions).insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get_by_session_id(
        &self,
        session_id: Uuid,
    ) -> Result<Option<RefreshSession>, AuthError> {
        Ok(guard(&self.sessions).get(&session_id).cloned())
    }

    async fn revoke_by_session_id(&self, session_id: Uuid) -> Result<(), AuthError> {
        self.check_writable()?;
        if let Some(session) = guard(&self.sessions).get_mut(&session_id) {
            if session.revoked_at.is_none() {
                session.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn revoke_all_by_user_id(&self, user_id: Uuid) -> Result<u64, AuthError> {
        self.check_writable()?;
        let mut revoked = 0;
        for session in guard(&self.sessions).values_mut() {
            if session.user_id == user_id && session.revoked_at.is_none() {
                session.revoked_at = Some(Utc::now());
                revoked += 1;
            }
        }
        Ok(revoked)
    }
}
