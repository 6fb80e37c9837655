//! Configuration for the token service

use acct_shared::config::AuthConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// `iss` claim
    pub issuer: String,
    /// `aud` claim
    pub audience: String,
    /// Access token lifetime in seconds
    pub access_token_ttl_seconds: i64,
    /// Refresh token lifetime in days
    pub refresh_token_ttl_days: i64,
    /// Days a revoked refresh token is kept before cleanup
    pub refresh_retention_days: i64,
    /// bcrypt cost for refresh secrets
    pub bcrypt_cost: u32,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self::from_settings(&AuthConfig::default())
    }
}

impl TokenServiceConfig {
    pub fn from_settings(settings: &AuthConfig) -> Self {
        Self {
            jwt_secret: settings.jwt.secret.clone(),
            issuer: settings.jwt.issuer.clone(),
            audience: settings.jwt.audience.clone(),
            access_token_ttl_seconds: settings.jwt.access_token_expiry,
            refresh_token_ttl_days: settings.jwt.refresh_token_ttl_days,
            refresh_retention_days: settings.jwt.refresh_retention_days,
            bcrypt_cost: settings.bcrypt_cost,
        }
    }
}
