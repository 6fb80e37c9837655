//! Configuration for the OTP service

use acct_shared::config::{Environment, OtpConfig};
use std::time::Duration;

/// Configuration for the OTP service
#[derive(Debug, Clone)]
pub struct OtpServiceConfig {
    /// Digits per code
    pub code_length: u32,
    /// Seconds a code stays valid
    pub expiration_seconds: i64,
    /// Wrong guesses before lockout
    pub max_attempts: u32,
    /// Lockout length in seconds
    pub lockout_seconds: i64,
    /// Minimum seconds between generations per key
    pub cooldown_seconds: i64,
    /// Seconds finished records are kept before cleanup
    pub retention_seconds: i64,
    /// Upper bound on one SMS gateway call
    pub sms_timeout: Duration,
    /// SMS body template with `{code}` and `{minutes}` placeholders
    pub message_template: String,
    /// Fixed code for development
    pub dev_fixed_code: Option<String>,
    /// Return the plaintext code in the dispatch result
    pub expose_code: bool,
}

impl Default for OtpServiceConfig {
    fn default() -> Self {
        Self::from_settings(&OtpConfig::default(), Environment::Development)
    }
}

impl OtpServiceConfig {
    /// Build from application settings; production never gets dev conveniences
    pub fn from_settings(settings: &OtpConfig, environment: Environment) -> Self {
        let production = environment.is_production();
        Self {
            code_length: settings.code_length,
            expiration_seconds: settings.expiration_seconds,
            max_attempts: settings.max_attempts.max(1),
            lockout_seconds: settings.lockout_seconds,
            cooldown_seconds: settings.cooldown_seconds,
            retention_seconds: settings.retention_seconds,
            sms_timeout: Duration::from_millis(settings.sms_timeout_ms),
            message_template: settings.message_template.clone(),
            dev_fixed_code: if production {
                None
            } else {
                settings.dev_fixed_code.clone()
            },
            expose_code: !production && settings.expose_code,
        }
    }
}
