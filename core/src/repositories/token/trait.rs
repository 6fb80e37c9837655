//! Refresh token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::RefreshTokenRecord;
use crate::errors::DomainError;

/// Repository trait for refresh token persistence
///
/// # Security Considerations
/// - Only bcrypt hashes of refresh secrets are stored
/// - `mark_rotated` and `revoke` are compare-and-swap on `revoked_at IS NULL`,
///   which is what limits a raw token to one successful rotation
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Save a new refresh token record
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError>;

    /// Find a record by id regardless of state
    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError>;

    /// All non-revoked, non-expired records of a user
    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError>;

    /// Revoke `id` and point it at `replaced_by`
    ///
    /// # Returns
    /// * `Ok(true)` - The record was active and is now rotated
    /// * `Ok(false)` - The record was already revoked (lost a race)
    async fn mark_rotated(
        &self,
        id: Uuid,
        replaced_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Revoke a single record; `false` if it was already revoked or missing
    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Revoke every non-revoked record of a user, returning how many changed
    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Delete records expired before `now` or revoked before `revoked_before`
    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
        revoked_before: DateTime<Utc>,
    ) -> Result<usize, DomainError>;
}
