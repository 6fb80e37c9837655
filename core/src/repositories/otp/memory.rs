//! In-memory OTP store
//!
//! Every operation runs under one write guard, which gives the same
//! atomicity the MySQL store gets from transactions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::otp::{OtpKey, OtpRecord, OtpStatus};
use crate::errors::DomainError;

use super::trait_::OtpStore;

/// OTP store backed by a vector
#[derive(Clone, Default)]
pub struct InMemoryOtpStore {
    records: Arc<RwLock<Vec<OtpRecord>>>,
}

impl InMemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored record for the key, oldest first
    pub async fn records_for(&self, key: &OtpKey) -> Vec<OtpRecord> {
        let records = self.records.read().await;
        records.iter().filter(|r| r.matches_key(key)).cloned().collect()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn newest<'a>(records: impl Iterator<Item = &'a OtpRecord>) -> Option<OtpRecord> {
    records.max_by_key(|r| r.created_at).cloned()
}

#[async_trait]
impl OtpStore for InMemoryOtpStore {
    async fn find_active(&self, key: &OtpKey) -> Result<Option<OtpRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(newest(
            records.iter().filter(|r| r.matches_key(key) && r.is_active()),
        ))
    }

    async fn find_latest(&self, key: &OtpKey) -> Result<Option<OtpRecord>, DomainError> {
        let records = self.records.read().await;
        Ok(newest(records.iter().filter(|r| r.matches_key(key))))
    }

    async fn replace_pending(&self, record: OtpRecord) -> Result<OtpRecord, DomainError> {
        let mut records = self.records.write().await;
        let key = record.key();
        records.retain(|r| !(r.matches_key(&key) && r.status == OtpStatus::Pending));
        records.push(record.clone());
        Ok(record)
    }

    async fn increment_attempts(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, DomainError> {
        let mut records = self.records.write().await;
        Ok(records
            .iter_mut()
            .find(|r| r.id == id && r.status == OtpStatus::Pending)
            .map(|r| {
                r.attempts += 1;
                r.updated_at = now;
                r.attempts
            }))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OtpStatus,
        to: OtpStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id && r.status == from) {
            Some(record) => {
                record.status = to;
                if let Some(expires_at) = expires_at {
                    record.expires_at = expires_at;
                }
                record.updated_at = now;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }

    async fn delete_stale_for_key(
        &self,
        key: &OtpKey,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| !(r.matches_key(key) && r.is_stale(now)));
        Ok((before - records.len()) as u64)
    }

    async fn delete_others_for_key(&self, key: &OtpKey, keep: Uuid) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id == keep || !r.matches_key(key));
        Ok((before - records.len()) as u64)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.expires_at >= cutoff && r.status != OtpStatus::Verified);
        Ok((before - records.len()) as u64)
    }
}
