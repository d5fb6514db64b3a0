//! Test doubles and fixtures for the auth service.
//!
//! In-memory store implementations keep the unit and integration suites
//! independent of a live database, and the token forge signs arbitrary
//! claims for negative-path verification tests.

pub mod hashing;
pub mod stores;
pub mod token_forge;

pub use hashing::RecordingHasher;
pub use stores::{InMemoryRefreshSessionStore, InMemoryUserStore};
pub use token_forge::sign_claims;
