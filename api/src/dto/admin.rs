use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use acct_core::domain::entities::sms_log::SmsLog;
use acct_core::domain::entities::user::Role;

/// Default and maximum page size for `GET /admin/sms-logs`
pub const SMS_LOG_DEFAULT_LIMIT: usize = 50;
pub const SMS_LOG_MAX_LIMIT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleRequest {
    #[validate(length(min = 1, max = 50))]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            description: role.description,
            created_at: role.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRolesResponse {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SmsLogQuery {
    pub phone: Option<String>,
    pub limit: Option<usize>,
}

impl SmsLogQuery {
    /// Requested page size clamped to `1..=SMS_LOG_MAX_LIMIT`
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(SMS_LOG_DEFAULT_LIMIT)
            .clamp(1, SMS_LOG_MAX_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmsLogResponse {
    pub id: Uuid,
    pub phone: String,
    pub message: String,
    pub provider: String,
    pub success: bool,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SmsLog> for SmsLogResponse {
    fn from(log: SmsLog) -> Self {
        Self {
            id: log.id,
            phone: log.phone,
            message: log.message,
            provider: log.provider,
            success: log.success,
            provider_message_id: log.provider_message_id,
            error: log.error,
            created_at: log.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sms_log_limit_is_clamped() {
        assert_eq!(SmsLogQuery::default().effective_limit(), SMS_LOG_DEFAULT_LIMIT);
        let huge = SmsLogQuery {
            phone: None,
            limit: Some(10_000),
        };
        assert_eq!(huge.effective_limit(), SMS_LOG_MAX_LIMIT);
        let zero = SmsLogQuery {
            phone: None,
            limit: Some(0),
        };
        assert_eq!(zero.effective_limit(), 1);
    }
}
