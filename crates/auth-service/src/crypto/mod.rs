//! Credential primitives: password hashing and the token codec.

pub mod tokens;

use crate::errors::AuthError;

/// Password digest creation and verification.
///
/// Verification distinguishes "wrong password" (`Ok(false)`) from a
/// malformed digest or hasher failure (`Err`): the first is a normal login
/// outcome, the second is an operational fault worth surfacing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;
    fn verify(&self, password: &str, digest: &str) -> Result<bool, AuthError>;
}

/// Bcrypt-backed hasher. Cost 12 is the production default; tests construct
/// it with a lower cost to keep the suite fast.
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new() -> Self {
        Self { cost: 12 }
    }

    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(|e| {
            tracing::error!(error = %e, "bcrypt hash failed");
            AuthError::Internal
        })
    }

    fn verify(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
        bcrypt::verify(password, digest).map_err(|e| {
            tracing::error!(error = %e, "bcrypt verify failed");
            AuthError::Internal
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hasher = BcryptHasher::with_cost(bcrypt::DEFAULT_COST.min(4));
        let digest = hasher.hash("hunter2").unwrap();

        assert!(hasher.verify("hunter2", &digest).unwrap());
        assert!(!hasher.verify("hunter3", &digest).unwrap());
    }

    #[test]
    fn test_malformed_digest_is_an_error() {
        let hasher = BcryptHasher::with_cost(4);
        assert!(hasher.verify("hunter2", "not-a-bcrypt-digest").is_err());
    }

    #[test]
    fn test_digests_are_salted() {
        let hasher = BcryptHasher::with_cost(4);
        let a = hasher.hash("hunter2").unwrap();
        let b = hasher.hash("hunter2").unwrap();
        assert_ne!(a, b);
    }
}
