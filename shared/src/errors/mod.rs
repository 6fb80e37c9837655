//! Shared error body and error codes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Machine-readable error carried in the `error` field of a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable error code for client identification
    pub code: String,

    /// Additional error details (field names, remaining attempts, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, serde_json::Value>>,
}

impl ErrorBody {
    /// Create an error body without details
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            details: None,
        }
    }

    /// Add a detail field to the error body
    pub fn add_detail(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let details = self.details.get_or_insert_with(BTreeMap::new);
        if let Ok(json_value) = serde_json::to_value(value) {
            details.insert(key.into(), json_value);
        }
        self
    }
}

/// Common error codes used across the application
pub mod error_codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const DUPLICATE_VALUE: &str = "DUPLICATE_VALUE";
    pub const PHONE_INVALID: &str = "PHONE_INVALID";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INVALID_CREDENTIALS: &str = "INVALID_CREDENTIALS";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const TOKEN_INVALID: &str = "TOKEN_INVALID";
    pub const INVALID_REFRESH_TOKEN: &str = "INVALID_OR_EXPIRED_REFRESH_TOKEN";
    pub const WRONG_TOKEN_TYPE: &str = "WRONG_TOKEN_TYPE";
    pub const FORBIDDEN: &str = "FORBIDDEN";
    pub const ACCOUNT_INACTIVE: &str = "ACCOUNT_INACTIVE";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const USER_NOT_FOUND: &str = "USER_NOT_FOUND";
    pub const OTP_NOT_FOUND: &str = "OTP_NOT_FOUND";
    pub const OTP_INVALID: &str = "OTP_INVALID";
    pub const OTP_EXPIRED: &str = "OTP_EXPIRED";
    pub const OTP_LOCKED: &str = "OTP_LOCKED";
    pub const RATE_LIMITED: &str = "RATE_LIMITED";
    pub const UPSTREAM_UNAVAILABLE: &str = "UPSTREAM_UNAVAILABLE";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}
