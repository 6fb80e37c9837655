//! MySQL implementation of the VerificationRequestRepository trait.
//!
//! `pending_type` is a generated column that is NULL once a request has been
//! reviewed; its unique index with `user_id` enforces one pending request per
//! user and verification type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use acct_core::domain::entities::verification_request::{
    VerificationRequest, VerificationStatus, VerificationType,
};
use acct_core::errors::{DomainError, ValidationError};
use acct_core::repositories::VerificationRequestRepository;

use super::{
    column, optional_uuid_column, parsed_column, query_failed, uuid_column, violated_unique_key,
};

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, verification_type, document_url, notes, status, reviewer_id,
           review_notes, reviewed_at, created_at, updated_at
    FROM verification_requests
"#;

pub struct MySqlVerificationRequestRepository {
    pool: MySqlPool,
}

impl MySqlVerificationRequestRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_request(row: &MySqlRow) -> Result<VerificationRequest, DomainError> {
        Ok(VerificationRequest {
            id: uuid_column(row, "id")?,
            user_id: uuid_column(row, "user_id")?,
            verification_type: parsed_column::<VerificationType>(row, "verification_type")?,
            document_url: column(row, "document_url")?,
            notes: column(row, "notes")?,
            status: parsed_column::<VerificationStatus>(row, "status")?,
            reviewer_id: optional_uuid_column(row, "reviewer_id")?,
            review_notes: column(row, "review_notes")?,
            reviewed_at: column(row, "reviewed_at")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl VerificationRequestRepository for MySqlVerificationRequestRepository {
    async fn create(&self, request: VerificationRequest) -> Result<VerificationRequest, DomainError> {
        let query = r#"
            INSERT INTO verification_requests (
                id, user_id, verification_type, document_url, notes, status, reviewer_id,
                review_notes, reviewed_at, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(request.id.to_string())
            .bind(request.user_id.to_string())
            .bind(request.verification_type.as_str())
            .bind(&request.document_url)
            .bind(&request.notes)
            .bind(request.status.as_str())
            .bind(request.reviewer_id.map(|id| id.to_string()))
            .bind(&request.review_notes)
            .bind(request.reviewed_at)
            .bind(request.created_at)
            .bind(request.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match violated_unique_key(&e).as_deref() {
                Some("uq_verification_pending") => ValidationError::DuplicatePendingRequest {
                    verification_type: request.verification_type.as_str().to_string(),
                }
                .into(),
                _ => query_failed("create verification request")(e),
            })?;

        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VerificationRequest>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("find verification request"))?;

        row.as_ref().map(Self::row_to_request).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<VerificationRequest>, DomainError> {
        let query = format!("{} WHERE user_id = ? ORDER BY created_at DESC", SELECT_COLUMNS);
        let rows = sqlx::query(&query)
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed("list verification requests"))?;

        rows.iter().map(Self::row_to_request).collect()
    }

    async fn list(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<VerificationRequest>, DomainError> {
        let rows = match status {
            Some(status) => {
                let query = format!("{} WHERE status = ? ORDER BY created_at DESC", SELECT_COLUMNS);
                sqlx::query(&query)
                    .bind(status.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!("{} ORDER BY created_at DESC", SELECT_COLUMNS);
                sqlx::query(&query).fetch_all(&self.pool).await
            }
        }
        .map_err(query_failed("list verification requests"))?;

        rows.iter().map(Self::row_to_request).collect()
    }

    async fn complete_review(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reviewer_id: Uuid,
        review_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationRequest>, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE verification_requests
            SET status = ?, reviewer_id = ?, review_notes = ?, reviewed_at = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(status.as_str())
        .bind(reviewer_id.to_string())
        .bind(&review_notes)
        .bind(now)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(query_failed("review verification request"))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }
}
