//! Gatehouse authentication service library.
//!
//! Issues short-lived HMAC-signed access tokens and long-lived, revocable
//! refresh sessions, validates bearer credentials on protected routes, and
//! supports point and bulk session termination.
//!
//! # Modules
//!
//! - `config` - Service configuration
//! - `crypto` - Password hashing and the token codec
//! - `errors` - Error types and their HTTP mapping
//! - `identity` - Principal carried through authenticated requests
//! - `handlers` - HTTP request handlers
//! - `middleware` - Request authentication middleware
//! - `models` - Persisted data models
//! - `repositories` - Database access layer
//! - `services` - Business logic layer

pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
