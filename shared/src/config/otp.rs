//! One-time password and SMS delivery configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Default SMS body. `{code}` and `{minutes}` are substituted at send time.
pub const DEFAULT_OTP_MESSAGE_TEMPLATE: &str =
    "Your verification code is {code}. It expires in {minutes} minutes.";

/// OTP engine configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OtpConfig {
    /// Number of digits in a generated code
    pub code_length: u32,

    /// Seconds a code stays valid after generation
    pub expiration_seconds: i64,

    /// Wrong guesses allowed before the key is locked
    pub max_attempts: u32,

    /// Seconds a locked key stays locked
    pub lockout_seconds: i64,

    /// Minimum seconds between two generations for the same key
    pub cooldown_seconds: i64,

    /// Seconds finished records are retained before cleanup
    pub retention_seconds: i64,

    /// Upper bound for one SMS gateway call in milliseconds
    pub sms_timeout_ms: u64,

    /// SMS body template
    pub message_template: String,

    /// Fixed code used instead of a random one (never honoured in production)
    #[serde(default)]
    pub dev_fixed_code: Option<String>,

    /// Echo the plaintext code in responses (never honoured in production)
    #[serde(default)]
    pub expose_code: bool,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            expiration_seconds: 300,
            max_attempts: 3,
            lockout_seconds: 1800,
            cooldown_seconds: 30,
            retention_seconds: 86_400,
            sms_timeout_ms: 5_000,
            message_template: DEFAULT_OTP_MESSAGE_TEMPLATE.to_string(),
            dev_fixed_code: None,
            expose_code: false,
        }
    }
}

impl OtpConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_length: env_or("OTP_LENGTH", defaults.code_length),
            expiration_seconds: env_or("OTP_EXPIRATION_SECONDS", defaults.expiration_seconds),
            max_attempts: env_or("OTP_MAX_ATTEMPTS", defaults.max_attempts),
            lockout_seconds: env_or("OTP_LOCKOUT_SECONDS", defaults.lockout_seconds),
            cooldown_seconds: env_or("OTP_COOLDOWN_SECONDS", defaults.cooldown_seconds),
            retention_seconds: env_or("OTP_RETENTION_SECONDS", defaults.retention_seconds),
            sms_timeout_ms: env_or("SMS_TIMEOUT_MS", defaults.sms_timeout_ms),
            message_template: std::env::var("OTP_MESSAGE_TEMPLATE")
                .unwrap_or(defaults.message_template),
            dev_fixed_code: std::env::var("OTP_DEV_FIXED_CODE")
                .ok()
                .filter(|code| !code.trim().is_empty()),
            expose_code: env_or("OTP_EXPOSE_CODE", defaults.expose_code),
        }
    }

    /// Drop every development convenience
    pub fn harden_for_production(mut self) -> Self {
        self.dev_fixed_code = None;
        self.expose_code = false;
        self
    }
}

/// SMS provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsProvider {
    /// Writes messages to the log instead of sending them
    Console,
    /// JSON-over-HTTP SMS gateway
    Http,
}

impl std::str::FromStr for SmsProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "mock" | "log" => Ok(SmsProvider::Console),
            "http" | "gateway" => Ok(SmsProvider::Http),
            _ => Err(format!("Invalid SMS provider: {}", s)),
        }
    }
}

/// SMS gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmsConfig {
    /// Provider implementation
    pub provider: SmsProvider,

    /// Gateway endpoint, e.g. `https://sms.example.com/api/send`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token for the gateway
    #[serde(default)]
    pub api_token: Option<String>,

    /// Sender identifier shown to recipients
    #[serde(default)]
    pub sender_id: Option<String>,

    /// HTTP client timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            provider: SmsProvider::Console,
            base_url: None,
            api_token: None,
            sender_id: None,
            timeout_ms: 5_000,
        }
    }
}

impl SmsConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("SMS_PROVIDER")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.provider),
            base_url: std::env::var("SMS_BASE_URL").ok(),
            api_token: std::env::var("SMS_API_TOKEN").ok(),
            sender_id: std::env::var("SMS_SENDER_ID").ok(),
            timeout_ms: env_or("SMS_TIMEOUT_MS", defaults.timeout_ms),
        }
    }

    /// Names of settings the selected provider requires but lacks
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.provider == SmsProvider::Http {
            if self.base_url.as_deref().map_or(true, str::is_empty) {
                missing.push("SMS_BASE_URL");
            }
            if self.api_token.as_deref().map_or(true, str::is_empty) {
                missing.push("SMS_API_TOKEN");
            }
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = OtpConfig::default();
        assert_eq!(config.code_length, 6);
        assert_eq!(config.expiration_seconds, 300);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.lockout_seconds, 1800);
        assert_eq!(config.cooldown_seconds, 30);
    }

    #[test]
    fn test_production_hardening() {
        let config = OtpConfig {
            dev_fixed_code: Some("123456".to_string()),
            expose_code: true,
            ..Default::default()
        }
        .harden_for_production();
        assert!(config.dev_fixed_code.is_none());
        assert!(!config.expose_code);
    }

    #[test]
    fn test_http_provider_requires_gateway_settings() {
        let config = SmsConfig {
            provider: SmsProvider::Http,
            base_url: Some("https://sms.example.com/send".to_string()),
            ..Default::default()
        };
        assert_eq!(config.missing_settings(), vec!["SMS_API_TOKEN"]);
        assert!(SmsConfig::default().missing_settings().is_empty());
    }
}
