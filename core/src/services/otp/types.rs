//! Result types for OTP operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of issuing a code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpDispatch {
    /// Whether the SMS gateway accepted the message
    pub sent: bool,
    /// Seconds until the code expires
    pub expires_in: i64,
    /// Gateway diagnostics; never contains the code
    pub provider_info: Option<String>,
    /// Plaintext code, only outside production with exposure enabled
    pub dev_code: Option<String>,
}

/// Outcome of a successful verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpVerified {
    /// Canonical phone the code was bound to
    pub phone: String,
    pub verified_at: DateTime<Utc>,
}
