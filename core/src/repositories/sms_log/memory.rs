//! In-memory SMS log

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::sms_log::SmsLog;
use crate::errors::DomainError;

use super::trait_::SmsLogRepository;

#[derive(Clone, Default)]
pub struct InMemorySmsLogRepository {
    logs: Arc<RwLock<Vec<SmsLog>>>,
}

impl InMemorySmsLogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SmsLogRepository for InMemorySmsLogRepository {
    async fn record(&self, log: SmsLog) -> Result<(), DomainError> {
        self.logs.write().await.push(log);
        Ok(())
    }

    async fn recent(&self, phone: Option<&str>, limit: usize) -> Result<Vec<SmsLog>, DomainError> {
        let logs = self.logs.read().await;
        let mut matching: Vec<SmsLog> = logs
            .iter()
            .filter(|log| phone.map_or(true, |p| log.phone == p))
            .cloned()
            .collect();
        matching.sort_by_key(|log| std::cmp::Reverse(log.created_at));
        matching.truncate(limit);
        Ok(matching)
    }
}
