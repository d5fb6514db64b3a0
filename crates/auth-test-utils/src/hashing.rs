use auth_service::crypto::PasswordHasher;
use auth_service::errors::AuthError;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Hasher double that uses transparent plain-text digests and counts
/// verification calls, so tests can assert timing-channel properties
/// without paying bcrypt cost.
#[derive(Default)]
pub struct RecordingHasher {
    verify_calls: AtomicUsize,
}

impl RecordingHasher {
    /// Digest that no password ever matches, for the unknown-email path.
    pub const DUMMY_DIGEST: &'static str = "dummy$never-matches";

    pub fn new() -> Self {
        Self::default()
    }

    /// Digest for a known password, in the same format `hash` produces.
    pub fn digest(password: &str) -> String {
        format!("plain${password}")
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl PasswordHasher for RecordingHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(Self::digest(password))
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        Ok(digest.strip_prefix("plain$") == Some(password))
    }
}
