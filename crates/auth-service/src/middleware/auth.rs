//! Bearer authentication for protected routes.

use crate::crypto::tokens::TokenType;
use crate::errors::AuthError;
use crate::handlers::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Verify the presented access token and stash the resulting [`Principal`]
/// in the request extensions for downstream extractors.
///
/// [`Principal`]: crate::identity::Principal
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(&req)
        .ok_or(AuthError::Unauthenticated("Authorization header required"))?;

    let principal = state.codec.verify(&token, TokenType::Access)?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Credential lookup: `Authorization: Bearer <token>` preferred, with a
/// `token` query parameter fallback for clients that cannot set headers.
/// A present but non-Bearer Authorization header is rejected rather than
/// falling through to the query string.
fn bearer_token(req: &Request) -> Option<String> {
    if let Some(value) = req.headers().get(AUTHORIZATION) {
        let value = value.to_str().ok()?;
        return value.strip_prefix("Bearer ").map(str::to_string);
    }

    req.uri().query()?.split('&').find_map(|pair| {
        pair.strip_prefix("token=")
            .filter(|t| !t.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_header() {
        let req = request("/protected", Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_non_bearer_header_rejected() {
        let req = request("/protected?token=fallback", Some("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_query_param_fallback() {
        let req = request("/protected?foo=1&token=abc.def.ghi", None);
        assert_eq!(bearer_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_empty_query_token_rejected() {
        let req = request("/protected?token=", None);
        assert_eq!(bearer_token(&req), None);
    }

    #[test]
    fn test_no_credential() {
        let req = request("/protected", None);
        assert_eq!(bearer_token(&req), None);
    }
}
