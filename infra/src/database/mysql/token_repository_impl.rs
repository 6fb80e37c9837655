//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! Only bcrypt hashes of refresh secrets reach this table. Rotation and
//! revocation are single `UPDATE ... WHERE revoked_at IS NULL` statements, so
//! two concurrent rotations of one token cannot both succeed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use acct_core::domain::entities::token::RefreshTokenRecord;
use acct_core::errors::DomainError;
use acct_core::repositories::RefreshTokenRepository;

use super::{column, optional_uuid_column, query_failed, uuid_column};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, token_hash, created_at, expires_at, revoked_at,
           replaced_by_token_id, metadata
    FROM refresh_tokens
"#;

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to RefreshTokenRecord entity
    fn row_to_token(row: &MySqlRow) -> Result<RefreshTokenRecord, DomainError> {
        let metadata: Option<serde_json::Value> = column(row, "metadata")?;
        Ok(RefreshTokenRecord {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            token_hash: column(row, "token_hash")?,
            created_at: column(row, "created_at")?,
            expires_at: column(row, "expires_at")?,
            revoked_at: column(row, "revoked_at")?,
            replaced_by_token_id: optional_uuid_column(row, "replaced_by_token_id")?,
            metadata: metadata.unwrap_or(serde_json::Value::Null),
        })
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn create(&self, record: RefreshTokenRecord) -> Result<RefreshTokenRecord, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                id, user_id, token_hash, created_at, expires_at, revoked_at,
                replaced_by_token_id, metadata
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(record.id.to_string())
            .bind(record.user_id.to_string())
            .bind(&record.token_hash)
            .bind(record.created_at)
            .bind(record.expires_at)
            .bind(record.revoked_at)
            .bind(record.replaced_by_token_id.map(|id| id.to_string()))
            .bind(&record.metadata)
            .execute(&self.pool)
            .await
            .map_err(query_failed("save refresh token"))?;

        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RefreshTokenRecord>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("find refresh token"))?;

        row.as_ref().map(Self::row_to_token).transpose()
    }

    async fn find_active_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshTokenRecord>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND revoked_at IS NULL AND expires_at > ? ORDER BY created_at DESC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed("find user refresh tokens"))?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn mark_rotated(
        &self,
        id: Uuid,
        replaced_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = ?, replaced_by_token_id = ?
            WHERE id = ? AND revoked_at IS NULL
            "#,
        )
        .bind(now)
        .bind(replaced_by.to_string())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_failed("rotate refresh token"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL",
        )
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_failed("revoke refresh token"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke_all_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = ? WHERE user_id = ? AND revoked_at IS NULL",
        )
        .bind(now)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_failed("revoke user refresh tokens"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired(
        &self,
        now: DateTime<Utc>,
        revoked_before: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let result = sqlx::query(
            "DELETE FROM refresh_tokens WHERE expires_at <= ? OR revoked_at < ?",
        )
        .bind(now)
        .bind(revoked_before)
        .execute(&self.pool)
        .await
        .map_err(query_failed("delete expired refresh tokens"))?;

        let deleted = result.rows_affected() as usize;
        if deleted > 0 {
            tracing::info!(deleted, "Deleted expired refresh tokens");
        }
        Ok(deleted)
    }
}
