//! OTP store trait defining the narrow persistence contract of the OTP engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::otp::{OtpKey, OtpRecord, OtpStatus};
use crate::errors::DomainError;

/// Persistence operations for OTP records
///
/// Implementations must make `replace_pending`, `increment_attempts` and
/// `transition` atomic at the store level. Several service instances may
/// share one store, so no process-local locking is assumed by callers.
#[async_trait]
pub trait OtpStore: Send + Sync {
    /// Newest pending or locked record for the key
    async fn find_active(&self, key: &OtpKey) -> Result<Option<OtpRecord>, DomainError>;

    /// Newest record for the key in any status
    async fn find_latest(&self, key: &OtpKey) -> Result<Option<OtpRecord>, DomainError>;

    /// Delete every pending record for the key and insert `record` in one step
    ///
    /// # Returns
    /// * `Ok(OtpRecord)` - The stored record
    /// * `Err(DomainError)` - Store failure
    async fn replace_pending(&self, record: OtpRecord) -> Result<OtpRecord, DomainError>;

    /// Increment `attempts` of a pending record
    ///
    /// # Returns
    /// * `Ok(Some(attempts))` - Attempt count after the increment
    /// * `Ok(None)` - Record missing or no longer pending
    async fn increment_attempts(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, DomainError>;

    /// Move a record from `from` to `to`, optionally replacing `expires_at`
    ///
    /// Returns `false` when the record is not in status `from`.
    async fn transition(
        &self,
        id: Uuid,
        from: OtpStatus,
        to: OtpStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Delete one record
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Delete verified, expired and lapsed locked records for the key
    async fn delete_stale_for_key(
        &self,
        key: &OtpKey,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError>;

    /// Delete every record for the key except `keep`
    async fn delete_others_for_key(&self, key: &OtpKey, keep: Uuid) -> Result<u64, DomainError>;

    /// Delete records whose `expires_at` lies before `cutoff`, plus every
    /// verified record since a consumed code is never read again
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError>;
}
