//! Business logic layer.

pub mod auth_service;
pub mod bootstrap;

pub use auth_service::{AuthService, SessionTokens};
