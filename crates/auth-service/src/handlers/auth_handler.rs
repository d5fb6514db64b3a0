//! HTTP surface of the auth service.

use crate::config::Config;
use crate::crypto::tokens::{JwtTokenCodec, TokenCodec};
use crate::crypto::BcryptHasher;
use crate::errors::AuthError;
use crate::identity::Principal;
use crate::repositories::refresh_sessions::PgRefreshSessionStore;
use crate::repositories::users::PgUserStore;
use crate::services::AuthService;
use axum::{extract::State, http::StatusCode, Json};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state. The codec is held separately from the service
/// so the auth middleware can verify tokens without going through it.
pub struct AppState {
    pub auth: AuthService,
    pub codec: Arc<dyn TokenCodec>,
}

impl AppState {
    pub fn new(pool: PgPool, config: &Config) -> Self {
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::new(&config.auth));
        let auth = AuthService::new(
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgRefreshSessionStore::new(pool)),
            codec.clone(),
            Arc::new(BcryptHasher::new()),
            config.auth.dummy_password_hash.clone(),
        );
        Self { auth, codec }
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let tokens = state
        .auth
        .login(&request.email, request.password.expose_secret())
        .await?;

    Ok(Json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
    }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, AuthError> {
    let access_token = state.auth.refresh(&request.refresh_token).await?;
    Ok(Json(RefreshResponse { access_token }))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<StatusCode, AuthError> {
    state.auth.logout(&principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn logout_all(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<StatusCode, AuthError> {
    state.auth.logout_all(&principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
