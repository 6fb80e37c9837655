//! SMS delivery log repository trait.

use async_trait::async_trait;

use crate::domain::entities::sms_log::SmsLog;
use crate::errors::DomainError;

/// Append-only log of outbound SMS attempts
#[async_trait]
pub trait SmsLogRepository: Send + Sync {
    async fn record(&self, log: SmsLog) -> Result<(), DomainError>;

    /// Newest entries first, optionally for one phone
    async fn recent(&self, phone: Option<&str>, limit: usize) -> Result<Vec<SmsLog>, DomainError>;
}
