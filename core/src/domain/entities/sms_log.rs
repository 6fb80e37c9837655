//! Outbound SMS delivery log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One delivery attempt; the message body has codes masked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsLog {
    pub id: Uuid,
    pub phone: String,
    pub message: String,
    pub provider: String,
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}
