use auth_service::crypto::tokens::TokenClaims;
use jsonwebtoken::{errors::Error, Algorithm, EncodingKey, Header};

/// Sign arbitrary claims with an arbitrary secret. Lets tests mint tokens
/// the production codec would refuse to issue: expired, missing session
/// claims, wrong class, wrong key.
pub fn sign_claims(claims: &TokenClaims, secret: &str) -> Result<String, Error> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}
