//! HMAC-signed token issuance and verification.
//!
//! Two token classes share one claims layout but are signed with separate
//! secrets, so an access token can never be replayed where a refresh token
//! is expected (and vice versa) even if the `typ` claim were forged.

use crate::errors::AuthError;
use crate::identity::{AuthSource, Principal, UserRole};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Wire layout of both token classes.
///
/// Refresh tokens carry `jti` (the session they name); access tokens carry
/// `refresh_jti` (the session that authorized them). Timestamps are whole
/// seconds since the epoch, as JWT requires.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    pub sub: Uuid,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_jti: Option<Uuid>,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub session_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct IssuedAccessToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Token issuance and verification seam, mockable for service tests.
pub trait TokenCodec: Send + Sync {
    fn issue_refresh_token(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<IssuedRefreshToken, AuthError>;

    fn issue_access_token(
        &self,
        user_id: Uuid,
        role: UserRole,
        parent_session_id: Uuid,
    ) -> Result<IssuedAccessToken, AuthError>;

    fn verify(&self, token: &str, expected: TokenType) -> Result<Principal, AuthError>;
}

struct TokenClass {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenClass {
    fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

/// HS256 codec with independent secrets and lifetimes per token class.
pub struct JwtTokenCodec {
    access: TokenClass,
    refresh: TokenClass,
}

impl JwtTokenCodec {
    pub fn new(auth: &AuthConfig) -> Self {
        Self {
            access: TokenClass::new(
                auth.access_token_secret.expose_secret().as_bytes(),
                auth.access_token_ttl,
            ),
            refresh: TokenClass::new(
                auth.refresh_token_secret.expose_secret().as_bytes(),
                auth.refresh_token_ttl,
            ),
        }
    }

    fn class(&self, token_type: TokenType) -> &TokenClass {
        match token_type {
            TokenType::Access => &self.access,
            TokenType::Refresh => &self.refresh,
        }
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        let class = self.class(claims.token_type);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &class.encoding_key).map_err(
            |e| {
                tracing::error!(error = %e, "token signing failed");
                AuthError::Internal
            },
        )
    }
}

/// Current time truncated to whole seconds, so the issued-at we report to
/// callers matches the `iat` embedded in the token exactly.
fn now_and_expiry(ttl: Duration) -> Result<(DateTime<Utc>, DateTime<Utc>), AuthError> {
    let iat = Utc::now().timestamp();
    let exp = iat + ttl.as_secs() as i64;
    let issued_at = DateTime::from_timestamp(iat, 0).ok_or(AuthError::Internal)?;
    let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::Internal)?;
    Ok((issued_at, expires_at))
}

impl TokenCodec for JwtTokenCodec {
    fn issue_refresh_token(
        &self,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<IssuedRefreshToken, AuthError> {
        let session_id = Uuid::new_v4();
        let (issued_at, expires_at) = now_and_expiry(self.refresh.ttl)?;

        let claims = TokenClaims {
            token_type: TokenType::Refresh,
            sub: user_id,
            role,
            jti: Some(session_id),
            refresh_jti: None,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(IssuedRefreshToken {
            token: self.sign(&claims)?,
            session_id,
            issued_at,
            expires_at,
        })
    }

    fn issue_access_token(
        &self,
        user_id: Uuid,
        role: UserRole,
        parent_session_id: Uuid,
    ) -> Result<IssuedAccessToken, AuthError> {
        let (issued_at, expires_at) = now_and_expiry(self.access.ttl)?;

        let claims = TokenClaims {
            token_type: TokenType::Access,
            sub: user_id,
            role,
            jti: None,
            refresh_jti: Some(parent_session_id),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(IssuedAccessToken {
            token: self.sign(&claims)?,
            issued_at,
            expires_at,
        })
    }

    fn verify(&self, token: &str, expected: TokenType) -> Result<Principal, AuthError> {
        let class = self.class(expected);

        // Pinning the algorithm here rejects tokens whose header names any
        // other algorithm, including "none".
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &class.decoding_key, &validation)
                .map_err(|_| AuthError::InvalidToken)?;
        let claims = data.claims;

        if claims.token_type != expected {
            return Err(AuthError::InvalidToken);
        }

        let (session_id, parent_session_id) = match expected {
            TokenType::Refresh => match claims.jti {
                Some(jti) => (Some(jti), None),
                None => return Err(AuthError::InvalidToken),
            },
            TokenType::Access => match claims.refresh_jti {
                Some(refresh_jti) => (None, Some(refresh_jti)),
                None => return Err(AuthError::InvalidToken),
            },
        };

        Ok(Principal {
            user_id: claims.sub,
            role: claims.role,
            auth_source: AuthSource::External,
            session_id,
            parent_session_id,
        })
    }
}
