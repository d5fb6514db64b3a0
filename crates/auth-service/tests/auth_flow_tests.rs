//! End-to-end HTTP tests over the full router with in-memory storage.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use auth_service::config::AuthConfig;
use auth_service::crypto::tokens::{JwtTokenCodec, TokenClaims, TokenCodec, TokenType};
use auth_service::handlers::AppState;
use auth_service::identity::UserRole;
use auth_service::routes::build_routes;
use auth_service::services::AuthService;
use auth_test_utils::{sign_claims, InMemoryRefreshSessionStore, InMemoryUserStore, RecordingHasher};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

const ACCESS_SECRET: &str = "test-access-secret";
const REFRESH_SECRET: &str = "test-refresh-secret";

struct TestApp {
    app: Router,
    users: Arc<InMemoryUserStore>,
    sessions: Arc<InMemoryRefreshSessionStore>,
}

fn test_app() -> TestApp {
    let users = Arc::new(InMemoryUserStore::new());
    let sessions = Arc::new(InMemoryRefreshSessionStore::new());
    let codec: Arc<dyn TokenCodec> = Arc::new(JwtTokenCodec::new(&AuthConfig {
        access_token_secret: SecretString::from(ACCESS_SECRET),
        refresh_token_secret: SecretString::from(REFRESH_SECRET),
        access_token_ttl: Duration::from_secs(3_600),
        refresh_token_ttl: Duration::from_secs(604_800),
        dummy_password_hash: RecordingHasher::DUMMY_DIGEST.to_string(),
    }));

    let auth = AuthService::new(
        users.clone(),
        sessions.clone(),
        codec.clone(),
        Arc::new(RecordingHasher::new()),
        RecordingHasher::DUMMY_DIGEST.to_string(),
    );

    let app = build_routes(Arc::new(AppState { auth, codec }));
    TestApp {
        app,
        users,
        sessions,
    }
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, email: &str, password: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn test_login_issues_tokens_and_opens_session() {
    let t = test_app();
    let user_id = t.users.add_user("alice@example.com", "pw", UserRole::User);

    let (access, refresh) = login(&t.app, "alice@example.com", "pw").await;
    assert!(!access.is_empty());
    assert!(!refresh.is_empty());

    let sessions = t.sessions.sessions_for(user_id);
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].revoked_at.is_none());
}

#[tokio::test]
async fn test_login_unknown_email_is_unauthorized() {
    let t = test_app();
    let user_id = t.users.add_user("alice@example.com", "pw", UserRole::User);

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({"email": "nobody@example.com", "password": "pw"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
    assert!(t.sessions.sessions_for(user_id).is_empty());
}

#[tokio::test]
async fn test_login_wrong_password_same_error_as_unknown_email() {
    let t = test_app();
    t.users.add_user("alice@example.com", "pw", UserRole::User);

    let wrong_password = t
        .app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({"email": "alice@example.com", "password": "nope"}),
        ))
        .await
        .unwrap();
    let unknown_email = t
        .app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/login",
            json!({"email": "nobody@example.com", "password": "pw"}),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(wrong_password).await,
        body_json(unknown_email).await
    );
}

#[tokio::test]
async fn test_refresh_returns_new_access_token() {
    let t = test_app();
    t.users.add_user("alice@example.com", "pw", UserRole::User);
    let (_, refresh) = login(&t.app, "alice@example.com", "pw").await;

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/refresh",
            json!({"refresh_token": refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_logout_then_refresh_fails() {
    let t = test_app();
    t.users.add_user("alice@example.com", "pw", UserRole::User);
    let (access, refresh) = login(&t.app, "alice@example.com", "pw").await;

    let response = t
        .app
        .clone()
        .oneshot(post_bearer("/api/v1/auth/logout", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = t
        .app
        .clone()
        .oneshot(post_json(
            "/api/v1/auth/refresh",
            json!({"refresh_token": refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_all_kills_every_session() {
    let t = test_app();
    t.users.add_user("alice@example.com", "pw", UserRole::User);

    let mut refresh_tokens = Vec::new();
    let mut last_access = String::new();
    for _ in 0..3 {
        let (access, refresh) = login(&t.app, "alice@example.com", "pw").await;
        refresh_tokens.push(refresh);
        last_access = access;
    }

    let response = t
        .app
        .clone()
        .oneshot(post_bearer("/api/v1/auth/logout/all", &last_access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    for refresh in &refresh_tokens {
        let response = t
            .app
            .clone()
            .oneshot(post_json(
                "/api/v1/auth/refresh",
                json!({"refresh_token": refresh}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_protected_route_requires_credential() {
    let t = test_app();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_protected_route_rejects_non_bearer_scheme() {
    let t = test_app();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/logout")
                .header(header::AUTHORIZATION, "Basic dXNlcjpwdw==")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_refresh_token_as_bearer() {
    let t = test_app();
    t.users.add_user("alice@example.com", "pw", UserRole::User);
    let (_, refresh) = login(&t.app, "alice@example.com", "pw").await;

    let response = t
        .app
        .clone()
        .oneshot(post_bearer("/api/v1/auth/logout", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_query_param_token_accepted() {
    let t = test_app();
    t.users.add_user("alice@example.com", "pw", UserRole::User);
    let (access, _) = login(&t.app, "alice@example.com", "pw").await;

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/v1/auth/logout?token={access}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_forged_expired_access_token_rejected() {
    let t = test_app();
    let now = Utc::now().timestamp();

    let claims = TokenClaims {
        token_type: TokenType::Access,
        sub: Uuid::new_v4(),
        role: UserRole::User,
        jti: None,
        refresh_jti: Some(Uuid::new_v4()),
        iat: now - 7_200,
        exp: now - 60,
    };
    let token = sign_claims(&claims, ACCESS_SECRET).unwrap();

    let response = t
        .app
        .clone()
        .oneshot(post_bearer("/api/v1/auth/logout", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forged_wrong_secret_token_rejected() {
    let t = test_app();
    let now = Utc::now().timestamp();

    let claims = TokenClaims {
        token_type: TokenType::Access,
        sub: Uuid::new_v4(),
        role: UserRole::Admin,
        jti: None,
        refresh_jti: Some(Uuid::new_v4()),
        iat: now,
        exp: now + 3_600,
    };
    let token = sign_claims(&claims, "attacker-secret").unwrap();

    let response = t
        .app
        .clone()
        .oneshot(post_bearer("/api/v1/auth/logout", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_is_public() {
    let t = test_app();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
