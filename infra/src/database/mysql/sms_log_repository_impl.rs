//! MySQL implementation of the SmsLogRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;

use acct_core::domain::entities::sms_log::SmsLog;
use acct_core::errors::DomainError;
use acct_core::repositories::SmsLogRepository;

use super::{column, query_failed, uuid_column};

const SELECT_COLUMNS: &str = r#"
    SELECT id, phone, message, provider, success, provider_message_id, error, created_at
    FROM sms_logs
"#;

pub struct MySqlSmsLogRepository {
    pool: MySqlPool,
}

impl MySqlSmsLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_log(row: &MySqlRow) -> Result<SmsLog, DomainError> {
        Ok(SmsLog {
            id: uuid_column(row, "id")?,
            phone: column(row, "phone")?,
            message: column(row, "message")?,
            provider: column(row, "provider")?,
            success: column(row, "success")?,
            provider_message_id: column(row, "provider_message_id")?,
            error: column(row, "error")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl SmsLogRepository for MySqlSmsLogRepository {
    async fn record(&self, log: SmsLog) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sms_logs (
                id, phone, message, provider, success, provider_message_id, error, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(log.id.to_string())
        .bind(&log.phone)
        .bind(&log.message)
        .bind(&log.provider)
        .bind(log.success)
        .bind(&log.provider_message_id)
        .bind(&log.error)
        .bind(log.created_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed("record SMS log"))?;

        Ok(())
    }

    async fn recent(&self, phone: Option<&str>, limit: usize) -> Result<Vec<SmsLog>, DomainError> {
        let limit = limit as i64;
        let rows = match phone {
            Some(phone) => {
                let query = format!(
                    "{} WHERE phone = ? ORDER BY created_at DESC LIMIT ?",
                    SELECT_COLUMNS
                );
                sqlx::query(&query)
                    .bind(phone)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let query = format!("{} ORDER BY created_at DESC LIMIT ?", SELECT_COLUMNS);
                sqlx::query(&query).bind(limit).fetch_all(&self.pool).await
            }
        }
        .map_err(query_failed("load SMS logs"))?;

        rows.iter().map(Self::row_to_log).collect()
    }
}
