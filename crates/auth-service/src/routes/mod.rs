//! Route table.

use crate::handlers::{auth_handler, AppState};
use crate::middleware::require_auth;
use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_routes(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/v1/auth/logout", post(auth_handler::logout))
        .route("/api/v1/auth/logout/all", post(auth_handler::logout_all))
        .layer(from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/health", get(auth_handler::health))
        .route("/api/v1/auth/login", post(auth_handler::login))
        .route("/api/v1/auth/refresh", post(auth_handler::refresh))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
