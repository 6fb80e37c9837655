//! MySQL implementation of the OtpStore trait.
//!
//! `storage_key` identifies the phone plus reference scope. The generated
//! `pending_key` column carries a unique index, so at most one pending record
//! per key can exist no matter how many service instances share the table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use acct_core::domain::entities::otp::{OtpKey, OtpRecord, OtpStatus};
use acct_core::errors::DomainError;
use acct_core::repositories::OtpStore;

use super::{column, parsed_column, query_failed, uuid_column, violated_unique_key};

/// Concurrent `replace_pending` calls for one key can collide on the pending
/// index; the loser retries against the winner's row.
const REPLACE_ATTEMPTS: usize = 3;

const SELECT_COLUMNS: &str = r#"
    SELECT id, phone, reference_type, reference_id, code_hash, attempts, status,
           created_at, expires_at, updated_at
    FROM otp_records
"#;

pub struct MySqlOtpStore {
    pool: MySqlPool,
}

impl MySqlOtpStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_record(row: &MySqlRow) -> Result<OtpRecord, DomainError> {
        Ok(OtpRecord {
            id: uuid_column(row, "id")?,
            phone: column(row, "phone")?,
            reference_type: column(row, "reference_type")?,
            reference_id: column(row, "reference_id")?,
            code_hash: column(row, "code_hash")?,
            attempts: column(row, "attempts")?,
            status: parsed_column::<OtpStatus>(row, "status")?,
            created_at: column(row, "created_at")?,
            expires_at: column(row, "expires_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }

    async fn try_replace_pending(&self, record: &OtpRecord) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM otp_records WHERE storage_key = ? AND status = 'pending'")
            .bind(record.key().storage_key())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO otp_records (
                id, storage_key, phone, reference_type, reference_id, code_hash,
                attempts, status, created_at, expires_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.key().storage_key())
        .bind(&record.phone)
        .bind(&record.reference_type)
        .bind(&record.reference_id)
        .bind(&record.code_hash)
        .bind(record.attempts)
        .bind(record.status.as_str())
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }
}

#[async_trait]
impl OtpStore for MySqlOtpStore {
    async fn find_active(&self, key: &OtpKey) -> Result<Option<OtpRecord>, DomainError> {
        let query = format!(
            "{} WHERE storage_key = ? AND status IN ('pending', 'locked') ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(key.storage_key())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("find active OTP"))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn find_latest(&self, key: &OtpKey) -> Result<Option<OtpRecord>, DomainError> {
        let query = format!(
            "{} WHERE storage_key = ? ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let row = sqlx::query(&query)
            .bind(key.storage_key())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("find latest OTP"))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn replace_pending(&self, record: OtpRecord) -> Result<OtpRecord, DomainError> {
        let mut attempt = 1;
        loop {
            match self.try_replace_pending(&record).await {
                Ok(()) => return Ok(record),
                Err(e) if violated_unique_key(&e).is_some() && attempt < REPLACE_ATTEMPTS => {
                    tracing::debug!(attempt, "Pending OTP insert raced another writer, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(query_failed("store OTP")(e)),
            }
        }
    }

    async fn increment_attempts(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<u32>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_failed("begin transaction"))?;

        let row = sqlx::query(
            "SELECT attempts FROM otp_records WHERE id = ? AND status = 'pending' FOR UPDATE",
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_failed("lock OTP"))?;

        let attempts = match row {
            Some(row) => column::<u32>(&row, "attempts")? + 1,
            None => return Ok(None),
        };

        sqlx::query("UPDATE otp_records SET attempts = ?, updated_at = ? WHERE id = ?")
            .bind(attempts)
            .bind(now)
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_failed("increment OTP attempts"))?;

        tx.commit().await.map_err(query_failed("commit OTP attempt"))?;
        Ok(Some(attempts))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: OtpStatus,
        to: OtpStatus,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE otp_records
            SET status = ?, expires_at = COALESCE(?, expires_at), updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(to.as_str())
        .bind(expires_at)
        .bind(now)
        .bind(id.to_string())
        .bind(from.as_str())
        .execute(&self.pool)
        .await
        .map_err(query_failed("update OTP status"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM otp_records WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failed("delete OTP"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_stale_for_key(
        &self,
        key: &OtpKey,
        now: DateTime<Utc>,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM otp_records
            WHERE storage_key = ?
              AND (status IN ('verified', 'expired') OR (status = 'locked' AND expires_at < ?))
            "#,
        )
        .bind(key.storage_key())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(query_failed("delete stale OTPs"))?;

        Ok(result.rows_affected())
    }

    async fn delete_others_for_key(&self, key: &OtpKey, keep: Uuid) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM otp_records WHERE storage_key = ? AND id <> ?")
            .bind(key.storage_key())
            .bind(keep.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failed("delete superseded OTPs"))?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<u64, DomainError> {
        let result = sqlx::query("DELETE FROM otp_records WHERE expires_at < ? OR status = ?")
            .bind(cutoff)
            .bind(OtpStatus::Verified.as_str())
            .execute(&self.pool)
            .await
            .map_err(query_failed("delete expired OTPs"))?;

        Ok(result.rows_affected())
    }
}
