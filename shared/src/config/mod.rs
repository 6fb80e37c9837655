//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `auth` - JWT and password settings
//! - `database` - Store backend selection and MySQL pool configuration
//! - `environment` - Environment detection, logging and maintenance scheduling
//! - `otp` - OTP engine and SMS gateway configuration
//! - `server` - HTTP server and CORS configuration
//!
//! Every struct has a `Default` and a `from_env()` constructor; `.env` files are
//! loaded by the binary before `AppConfig::from_env()` runs.

pub mod auth;
pub mod database;
pub mod environment;
pub mod otp;
pub mod server;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{AuthConfig, JwtConfig};
pub use database::{DatabaseConfig, StorageBackend};
pub use environment::{Environment, LogFormat, LoggingConfig, MaintenanceConfig};
pub use otp::{OtpConfig, SmsConfig, SmsProvider, DEFAULT_OTP_MESSAGE_TEMPLATE};
pub use server::{CorsConfig, ServerConfig};

/// Read an environment variable and parse it, falling back to `default`
/// when the variable is unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

/// Startup configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in {environment}")]
    DefaultJwtSecret { environment: Environment },

    #[error("SMS gateway is missing required settings: {missing}")]
    SmsGatewayMisconfigured { missing: String },

    #[error("OTP length must be between 4 and 10 digits, got {length}")]
    InvalidOtpLength { length: u32 },

    #[error("OTP_DEV_FIXED_CODE must be {length} digits")]
    InvalidDevCode { length: u32 },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// OTP engine configuration
    pub otp: OtpConfig,

    /// SMS gateway configuration
    pub sms: SmsConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Background maintenance
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Default country calling code for phone normalization
    pub default_country_code: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::development()
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            otp: OtpConfig {
                dev_fixed_code: Some("123456".to_string()),
                expose_code: true,
                ..Default::default()
            },
            sms: SmsConfig::default(),
            cors: CorsConfig::development(),
            logging: LoggingConfig::for_environment(Environment::Development),
            maintenance: MaintenanceConfig::default(),
            default_country_code: crate::utils::phone::DEFAULT_COUNTRY_CODE.to_string(),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        let otp = OtpConfig::from_env();
        let otp = if environment.is_production() {
            otp.harden_for_production()
        } else {
            otp
        };
        let cors_fallback = if environment.is_production() {
            CorsConfig::default()
        } else {
            CorsConfig::development()
        };

        Self {
            environment,
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            otp,
            sms: SmsConfig::from_env(),
            cors: CorsConfig::from_env_or(cors_fallback),
            logging: LoggingConfig::from_env(environment),
            maintenance: MaintenanceConfig::from_env(),
            default_country_code: std::env::var("PHONE_DEFAULT_COUNTRY_CODE")
                .map(|code| code.trim_start_matches('+').to_string())
                .unwrap_or_else(|_| crate::utils::phone::DEFAULT_COUNTRY_CODE.to_string()),
        }
    }

    /// Reject configurations the service must not start with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment.is_production() && self.auth.jwt.is_using_default_secret() {
            return Err(ConfigError::DefaultJwtSecret {
                environment: self.environment,
            });
        }

        let missing = self.sms.missing_settings();
        if !missing.is_empty() {
            return Err(ConfigError::SmsGatewayMisconfigured {
                missing: missing.join(", "),
            });
        }

        if !(4..=10).contains(&self.otp.code_length) {
            return Err(ConfigError::InvalidOtpLength {
                length: self.otp.code_length,
            });
        }

        if let Some(code) = &self.otp.dev_fixed_code {
            let well_formed = code.len() == self.otp.code_length as usize
                && code.chars().all(|c| c.is_ascii_digit());
            if !well_formed {
                return Err(ConfigError::InvalidDevCode {
                    length: self.otp.code_length,
                });
            }
        }

        Ok(())
    }
}
