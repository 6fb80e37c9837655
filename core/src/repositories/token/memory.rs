//! In-memory refresh token repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

use super::trait_::RefreshTokenRepository;

/// Refresh token repository keyed by record id
#[derive(Clone, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, RefreshTokenRecord>>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&record.id) {
            return Err(DomainError::internal("refresh token id collision"));
        }
        tokens.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        Ok(self.tokens.read().await.get(&id).cloned())
    }

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut active: Vec<RefreshTokenRecord> = tokens
            .values()
            .filter(|t| t.user_id == user_id && t.is_valid_at(now))
            .cloned()
            .collect();
        active.sort_by_key(|t| std::cmp::Reverse(t.created_at));
        Ok(active)
    }

    async fn mark_rotated(
        &self,
        id: Uuid,
        replaced_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&id) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(now);
                token.replaced_by_token_id = Some(replaced_by);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&id) {
            Some(token) if token.revoked_at.is_none() => {
                token.revoked_at = Some(now);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;
        for token in tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && t.revoked_at.is_none())
        {
            token.revoked_at = Some(now);
            count += 1;
        }
        Ok(count)
    }

    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
        revoked_before: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, t| {
            let expired = t.expires_at <= now;
            let stale_revoked = t.revoked_at.map_or(false, |at| at < revoked_before);
            !(expired || stale_revoked)
        });
        Ok(before - tokens.len())
    }
}
