//! JSON-over-HTTP SMS gateway
//!
//! Sends `POST {base_url}` with a bearer token and a body of
//! `{"to", "message", "sender"}`. Any 2xx response counts as accepted; the
//! provider message id is read from `messageId` or `id` when present.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use acct_core::services::otp::{SmsError, SmsGateway, SmsReceipt};
use acct_shared::config::SmsConfig;
use acct_shared::phone::mask_phone_number;

use crate::InfrastructureError;

const PROVIDER: &str = "http";

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    message_id: Option<String>,
    id: Option<String>,
}

/// Gateway client built from [`SmsConfig`]
pub struct HttpSmsGateway {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
    sender_id: Option<String>,
}

impl HttpSmsGateway {
    /// Build the client; fails when the endpoint or token is missing
    pub fn new(config: &SmsConfig) -> Result<Self, InfrastructureError> {
        let endpoint = config
            .base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| InfrastructureError::Config("SMS_BASE_URL is not set".to_string()))?;
        let api_token = config
            .api_token
            .clone()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| InfrastructureError::Config("SMS_API_TOKEN is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        tracing::info!(endpoint = %endpoint, "HTTP SMS gateway initialized");

        Ok(Self {
            client,
            endpoint,
            api_token,
            sender_id: config.sender_id.clone(),
        })
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    async fn send_sms(&self, phone: &str, message: &str) -> Result<SmsReceipt, SmsError> {
        let body = SendRequest {
            to: phone,
            message,
            sender: self.sender_id.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                phone = %mask_phone_number(phone),
                status = status.as_u16(),
                "SMS gateway rejected message"
            );
            return Err(SmsError::Rejected {
                status: status.as_u16(),
            });
        }

        // A 2xx with an unexpected body is still an accepted message
        let parsed: SendResponse = response.json().await.unwrap_or_default();
        Ok(SmsReceipt::new(PROVIDER, parsed.message_id.or(parsed.id)))
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acct_shared::config::SmsProvider;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> SmsConfig {
        SmsConfig {
            provider: SmsProvider::Http,
            base_url: Some(base_url),
            api_token: Some("gateway-token".to_string()),
            sender_id: Some("ACCOUNTS".to_string()),
            timeout_ms: 2_000,
        }
    }

    #[tokio::test]
    async fn test_send_posts_json_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("authorization", "Bearer gateway-token"))
            .and(body_json(json!({
                "to": "+251911000000",
                "message": "Your code is 123456",
                "sender": "ACCOUNTS"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messageId": "m-42" })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = HttpSmsGateway::new(&config(format!("{}/send", server.uri()))).unwrap();
        let receipt = gateway
            .send_sms("+251911000000", "Your code is 123456")
            .await
            .unwrap();

        assert_eq!(receipt.provider, "http");
        assert_eq!(receipt.message_id.as_deref(), Some("m-42"));
    }

    #[tokio::test]
    async fn test_non_success_status_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let gateway = HttpSmsGateway::new(&config(server.uri())).unwrap();
        let result = gateway.send_sms("+251911000000", "hello").await;

        assert_eq!(result, Err(SmsError::Rejected { status: 502 }));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;

        let gateway = HttpSmsGateway::new(&config(server.uri())).unwrap();
        let receipt = gateway.send_sms("+251911000000", "hello").await.unwrap();
        assert!(receipt.message_id.is_none());
    }

    #[test]
    fn test_missing_settings_fail_construction() {
        let mut incomplete = config("https://sms.example.com/send".to_string());
        incomplete.api_token = None;
        assert!(matches!(
            HttpSmsGateway::new(&incomplete),
            Err(InfrastructureError::Config(_))
        ));
    }
}
