//! SMS gateway integration

use async_trait::async_trait;
use thiserror::Error;

/// Provider acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsReceipt {
    /// Provider name, e.g. `http` or `console`
    pub provider: String,
    /// Provider-side message id, when the gateway returns one
    pub message_id: Option<String>,
}

impl SmsReceipt {
    pub fn new(provider: impl Into<String>, message_id: Option<String>) -> Self {
        Self {
            provider: provider.into(),
            message_id,
        }
    }

    /// Short diagnostic string safe to return to clients
    pub fn describe(&self) -> String {
        match &self.message_id {
            Some(id) => format!("{}:{}", self.provider, id),
            None => self.provider.clone(),
        }
    }
}

/// SMS delivery failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SmsError {
    #[error("SMS gateway rejected the message with status {status}")]
    Rejected { status: u16 },

    #[error("SMS gateway unreachable: {0}")]
    Transport(String),

    #[error("SMS gateway misconfigured: {0}")]
    Misconfigured(String),
}

/// Trait for SMS service integration
///
/// Implementations are unreliable external collaborators. Callers bound every
/// call with a timeout and treat failures as non-fatal.
#[async_trait]
pub trait SmsGateway: Send + Sync {
    /// Deliver `message` to a canonical phone number
    async fn send_sms(&self, phone: &str, message: &str) -> Result<SmsReceipt, SmsError>;

    /// Provider name used in logs
    fn provider_name(&self) -> &str;
}
