//! SMS gateway implementations
//!
//! - [`HttpSmsGateway`]: JSON-over-HTTP provider for production
//! - [`ConsoleSmsGateway`]: logs messages instead of sending them
//! - [`RecordingSmsGateway`]: decorator writing every attempt to the SMS log

pub mod console;
pub mod http;
pub mod recording;

use std::sync::Arc;

use acct_core::repositories::SmsLogRepository;
use acct_core::services::otp::SmsGateway;
use acct_shared::config::{SmsConfig, SmsProvider};

use crate::InfrastructureError;

pub use console::ConsoleSmsGateway;
pub use http::HttpSmsGateway;
pub use recording::{mask_codes, RecordingSmsGateway};

/// Build the configured gateway, wrapped so every attempt is logged
pub fn build_gateway(
    config: &SmsConfig,
    logs: Arc<dyn SmsLogRepository>,
) -> Result<Arc<dyn SmsGateway>, InfrastructureError> {
    let inner: Arc<dyn SmsGateway> = match config.provider {
        SmsProvider::Console => Arc::new(ConsoleSmsGateway::new()),
        SmsProvider::Http => Arc::new(HttpSmsGateway::new(config)?),
    };
    tracing::info!(provider = inner.provider_name(), "SMS gateway selected");
    Ok(Arc::new(RecordingSmsGateway::new(inner, logs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use acct_core::repositories::InMemorySmsLogRepository;

    #[test]
    fn test_build_gateway_selects_provider() {
        let logs: Arc<dyn SmsLogRepository> = Arc::new(InMemorySmsLogRepository::new());

        let console = build_gateway(&SmsConfig::default(), logs.clone()).unwrap();
        assert_eq!(console.provider_name(), "console");

        let http = SmsConfig {
            provider: SmsProvider::Http,
            base_url: Some("https://sms.example.com/send".to_string()),
            api_token: Some("token".to_string()),
            ..Default::default()
        };
        assert_eq!(build_gateway(&http, logs.clone()).unwrap().provider_name(), "http");

        let broken = SmsConfig {
            provider: SmsProvider::Http,
            ..Default::default()
        };
        assert!(build_gateway(&broken, logs).is_err());
    }
}
