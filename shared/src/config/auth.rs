//! Authentication and authorization configuration

use serde::{Deserialize, Serialize};

use super::env_or;

const DEFAULT_JWT_SECRET: &str = "your-secret-key-change-in-production";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// JWT secret key for signing tokens (HS256)
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,

    /// Days a revoked refresh token row is kept before cleanup
    pub refresh_retention_days: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: 900,
            refresh_token_ttl_days: 7,
            refresh_retention_days: 30,
            issuer: String::from("account-service"),
            audience: String::from("account-service-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_TTL_SECONDS", defaults.access_token_expiry),
            refresh_token_ttl_days: env_or("REFRESH_TOKEN_TTL_DAYS", defaults.refresh_token_ttl_days),
            refresh_retention_days: env_or(
                "REFRESH_TOKEN_RETENTION_DAYS",
                defaults.refresh_retention_days,
            ),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_ttl_days = days;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Minimum accepted password length at registration
    pub password_min_length: usize,

    /// bcrypt cost factor for passwords and refresh token secrets
    pub bcrypt_cost: u32,

    /// Emails or canonical phones granted the admin role at registration
    #[serde(default)]
    pub bootstrap_admins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            password_min_length: 8,
            bcrypt_cost: 10,
            bootstrap_admins: Vec::new(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt: JwtConfig::from_env(),
            password_min_length: env_or("PASSWORD_MIN_LENGTH", defaults.password_min_length),
            bcrypt_cost: env_or("BCRYPT_COST", defaults.bcrypt_cost),
            bootstrap_admins: std::env::var("BOOTSTRAP_ADMINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|entry| entry.trim().to_lowercase())
                        .filter(|entry| !entry.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.bootstrap_admins),
        }
    }
}
