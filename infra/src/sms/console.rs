//! Console SMS gateway for development
//!
//! Writes each message to the log instead of sending it. The full text,
//! including any code, is logged at INFO so local OTP flows can be completed
//! without a provider.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

use acct_core::services::otp::{SmsError, SmsGateway, SmsReceipt};
use acct_shared::phone::mask_phone_number;

const PROVIDER: &str = "console";

#[derive(Default)]
pub struct ConsoleSmsGateway {
    sent: AtomicU64,
}

impl ConsoleSmsGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages "sent" so far
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SmsGateway for ConsoleSmsGateway {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let count = self.sent.fetch_add(1, Ordering::SeqCst) + 1;
        let message_id = format!("console-{}", count);

        tracing::info!(
            target: "sms_console",
            provider = PROVIDER,
            phone = %mask_phone_number(phone),
            message_id = %message_id,
            message = %message,
            "SMS written to console"
        );

        Ok(SmsReceipt::new(PROVIDER, Some(message_id)))
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
