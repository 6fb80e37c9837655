//! Mock SMS gateways for testing the OTP service

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::services::otp::{SmsError, SmsGateway, SmsReceipt};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum GatewayBehaviour {
    Accept,
    Fail,
    Hang,
}

/// Records every message and answers according to `behaviour`
pub struct MockSmsGateway {
    pub sent: Arc<Mutex<Vec<(String, String)>>>,
    behaviour: GatewayBehaviour,
}

impl MockSmsGateway {
    pub fn new(behaviour: GatewayBehaviour) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            behaviour,
        }
    }

    pub fn accepting() -> Self {
        Self::new(GatewayBehaviour::Accept)
    }

    pub fn messages(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_message(&self) -> Option<String> {
        self.messages().last().map(|(_, body)| body.clone())
    }
}

#[async_trait]
impl SmsGateway for MockSmsGateway {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        self.sent
            .lock()
            .unwrap()
            .push((phone.to_string(), message.to_string()));
        match self.behaviour {
            GatewayBehaviour::Accept => Ok(SmsReceipt::new("mock", Some("mock-msg-1".into()))),
            GatewayBehaviour::Fail => Err(SmsError::Rejected { status: 502 }),
            GatewayBehaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(SmsReceipt::new("mock", None))
            }
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}
