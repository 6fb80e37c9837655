//! Delivery-log decorator
//!
//! Wraps any gateway and appends an [`SmsLog`] entry for every attempt. Runs
//! of four or more digits are masked before the message is stored, so the
//! log never holds a usable code. A failing log write is reported but never
//! changes the delivery result.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use uuid::Uuid;

use acct_core::domain::entities::sms_log::SmsLog;
use acct_core::repositories::SmsLogRepository;
use acct_core::services::otp::{SmsError, SmsGateway, SmsReceipt};

static CODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4,}").unwrap());

/// Replace every run of four or more digits with asterisks of equal length
pub fn mask_codes(message: &str) -> String {
    CODE_REGEX
        .replace_all(message, |caps: &regex::Captures| "*".repeat(caps[0].len()))
        .into_owned()
}

pub struct RecordingSmsGateway {
    inner: Arc<dyn SmsGateway>,
    logs: Arc<dyn SmsLogRepository>,
}

impl RecordingSmsGateway {
    pub fn new(inner: Arc<dyn SmsGateway>, logs: Arc<dyn SmsLogRepository>) -> Self {
        Self { inner, logs }
    }
}

#[async_trait]
impl SmsGateway for RecordingSmsGateway {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let result = self.inner.send_sms(phone, message).await;

        let (provider_message_id, error) = match &result {
            Ok(receipt) => (receipt.message_id.clone(), None),
            Err(e) => (None, Some(e.to_string())),
        };
        let entry = SmsLog {
            id: Uuid::new_v4(),
            phone: phone.to_string(),
            message: mask_codes(message),
            provider: self.inner.provider_name().to_string(),
            success: result.is_ok(),
            provider_message_id,
            error,
            created_at: Utc::now(),
        };
        if let Err(e) = self.logs.record(entry).await {
            tracing::warn!(error = %e, "Failed to record SMS delivery log");
        }

        result
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acct_core::repositories::InMemorySmsLogRepository;

    struct FailingGateway;

    #[async_trait]
    impl SmsGateway for FailingGateway {
        async fn send_sms(&self, _phone: &str, _message: &str) -> Result<SmsReceipt, SmsError> {
            Err(SmsError::Rejected { status: 503 })
        }

        fn provider_name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_mask_codes() {
        assert_eq!(
            mask_codes("Your verification code is 004271. It expires in 5 minutes."),
            "Your verification code is ******. It expires in 5 minutes."
        );
        assert_eq!(mask_codes("Call 911"), "Call 911");
    }

    #[tokio::test]
    async fn test_successful_send_is_logged_with_masked_code() {
        let logs = InMemorySmsLogRepository::new();
        let gateway = RecordingSmsGateway::new(
            Arc::new(crate::sms::ConsoleSmsGateway::new()),
            Arc::new(logs.clone()),
        );

        gateway
            .send_sms("+251911000000", "Code 123456")
            .await
            .unwrap();

        let entries = logs.recent(None, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].success);
        assert_eq!(entries[0].message, "Code ******");
        assert_eq!(entries[0].provider, "console");
        assert_eq!(entries[0].provider_message_id.as_deref(), Some("console-1"));
    }

    #[tokio::test]
    async fn test_failed_send_is_logged_and_returned() {
        let logs = InMemorySmsLogRepository::new();
        let gateway = RecordingSmsGateway::new(Arc::new(FailingGateway), Arc::new(logs.clone()));

        let result = gateway.send_sms("+251911000000", "Code 123456").await;
        assert_eq!(result, Err(SmsError::Rejected { status: 503 }));

        let entries = logs.recent(Some("+251911000000"), 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].success);
        assert!(entries[0].error.as_deref().unwrap().contains("503"));
    }
}
