use secrecy::SecretString;
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 3_600; // 1 hour
const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 604_800; // 168 hours

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub auth: AuthConfig,
    pub admin: AdminConfig,
}

/// Token signing configuration. One secret and one TTL per token class.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub access_token_secret: SecretString,
    pub refresh_token_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Bcrypt digest verified against when a login names an unknown email,
    /// so lookup failure and password failure cost the same.
    pub dummy_password_hash: String,
}

/// Credentials for the first-run admin account.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a map (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = require(vars, "DATABASE_URL")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let auth = AuthConfig {
            access_token_secret: SecretString::from(require(vars, "AUTH_ACCESS_TOKEN_SECRET")?),
            refresh_token_secret: SecretString::from(require(vars, "AUTH_REFRESH_TOKEN_SECRET")?),
            access_token_ttl: ttl_from(
                vars,
                "AUTH_ACCESS_TOKEN_TTL_SECS",
                DEFAULT_ACCESS_TOKEN_TTL_SECS,
            )?,
            refresh_token_ttl: ttl_from(
                vars,
                "AUTH_REFRESH_TOKEN_TTL_SECS",
                DEFAULT_REFRESH_TOKEN_TTL_SECS,
            )?,
            dummy_password_hash: require(vars, "AUTH_DUMMY_PASSWORD_HASH")?,
        };

        let admin = AdminConfig {
            email: require(vars, "ADMIN_EMAIL")?,
            password: SecretString::from(require(vars, "ADMIN_PASSWORD")?),
        };

        Ok(Config {
            database_url,
            bind_address,
            auth,
            admin,
        })
    }
}

fn require(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|v| !v.is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn ttl_from(
    vars: &HashMap<String, String>,
    name: &str,
    default_secs: u64,
) -> Result<Duration, ConfigError> {
    match vars.get(name) {
        None => Ok(Duration::from_secs(default_secs)),
        Some(raw) => raw
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
    }
}
