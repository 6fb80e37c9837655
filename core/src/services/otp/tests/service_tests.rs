//! Unit tests for the OTP service

use std::sync::Arc;
use std::time::Duration as StdDuration;

use acct_shared::phone::PhoneNormalizer;
use chrono::{Duration, Utc};

use crate::domain::clock::{Clock, ManualClock};
use crate::domain::entities::otp::{OtpKey, OtpReference, OtpStatus};
use crate::errors::{DomainError, OtpError, ValidationError};
use crate::repositories::InMemoryOtpStore;
use crate::services::hashing::hash_otp;
use crate::services::otp::{OtpService, OtpServiceConfig};

use super::mocks::{GatewayBehaviour, MockSmsGateway};

const PHONE: &str = "+251911000000";

struct Harness {
    service: OtpService,
    store: InMemoryOtpStore,
    sms: Arc<MockSmsGateway>,
    clock: Arc<ManualClock>,
}

fn test_config() -> OtpServiceConfig {
    OtpServiceConfig {
        dev_fixed_code: None,
        expose_code: true,
        ..Default::default()
    }
}

fn harness_with(config: OtpServiceConfig, behaviour: GatewayBehaviour) -> Harness {
    let store = InMemoryOtpStore::new();
    let sms = Arc::new(MockSmsGateway::new(behaviour));
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = OtpService::new(
        Arc::new(store.clone()),
        sms.clone(),
        clock.clone(),
        PhoneNormalizer::default(),
        config,
    );
    Harness {
        service,
        store,
        sms,
        clock,
    }
}

fn harness() -> Harness {
    harness_with(test_config(), GatewayBehaviour::Accept)
}

/// A code of the same width that differs in every digit
fn wrong_code(code: &str) -> String {
    code.chars()
        .map(|c| {
            let digit = c.to_digit(10).unwrap_or(0);
            std::char::from_digit((digit + 1) % 10, 10).unwrap_or('0')
        })
        .collect()
}

async fn issue(h: &Harness, phone: &str) -> String {
    h.service
        .generate_and_send_otp(phone, None, None)
        .await
        .unwrap()
        .dev_code
        .expect("dev code exposed in tests")
}

#[tokio::test]
async fn test_generate_stores_digest_and_sends_sms() {
    let h = harness();

    let dispatch = h
        .service
        .generate_and_send_otp("0911000000", None, None)
        .await
        .unwrap();

    assert!(dispatch.sent);
    assert_eq!(dispatch.expires_in, 300);
    let code = dispatch.dev_code.unwrap();
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let records = h.store.records_for(&OtpKey::phone(PHONE)).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, OtpStatus::Pending);
    assert_eq!(records[0].code_hash, hash_otp(&code));
    assert_ne!(records[0].code_hash, code);

    let messages = h.sms.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, PHONE);
    assert!(messages[0].1.contains(&code));
    assert!(messages[0].1.contains("5 minutes"));
}

#[tokio::test]
async fn test_generate_rejects_invalid_phone() {
    let h = harness();

    let result = h.service.generate_and_send_otp("12ab", None, None).await;

    assert!(matches!(
        result,
        Err(DomainError::ValidationErr(ValidationError::InvalidPhone { .. }))
    ));
    assert!(h.store.is_empty().await);
    assert!(h.sms.messages().is_empty());
}

#[tokio::test]
async fn test_cooldown_blocks_rapid_requests() {
    let h = harness();
    issue(&h, PHONE).await;

    h.clock.advance(Duration::seconds(10));
    let result = h.service.generate_and_send_otp(PHONE, None, None).await;
    assert!(matches!(
        result,
        Err(DomainError::Otp(OtpError::RateLimited {
            retry_after_seconds: 20
        }))
    ));

    h.clock.advance(Duration::seconds(20));
    assert!(h.service.generate_and_send_otp(PHONE, None, None).await.is_ok());
    assert_eq!(h.sms.messages().len(), 2);
}

#[tokio::test]
async fn test_new_code_supersedes_previous_one() {
    let h = harness();
    let first = issue(&h, PHONE).await;
    h.clock.advance(Duration::seconds(30));
    let second = issue(&h, PHONE).await;

    let records = h.store.records_for(&OtpKey::phone(PHONE)).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code_hash, hash_otp(&second));

    if first != second {
        let stale = h.service.verify_otp(PHONE, &first, None).await;
        assert!(matches!(
            stale,
            Err(DomainError::Otp(OtpError::InvalidCode { .. }))
        ));
    }
    assert!(h.service.verify_otp(PHONE, &second, None).await.is_ok());
}

#[tokio::test]
async fn test_code_verifies_exactly_once() {
    let h = harness();
    let code = issue(&h, PHONE).await;

    let verified = h.service.verify_otp("0911000000", &code, None).await.unwrap();
    assert_eq!(verified.phone, PHONE);
    assert_eq!(verified.verified_at, h.clock.now());

    let again = h.service.verify_otp(PHONE, &code, None).await;
    assert!(matches!(again, Err(DomainError::Otp(OtpError::NotFound))));
}

#[tokio::test]
async fn test_verify_without_code_is_not_found() {
    let h = harness();
    let result = h.service.verify_otp(PHONE, "123456", None).await;
    assert!(matches!(result, Err(DomainError::Otp(OtpError::NotFound))));
}

#[tokio::test]
async fn test_wrong_codes_lock_the_phone() {
    let h = harness();
    let code = issue(&h, PHONE).await;
    let wrong = wrong_code(&code);

    let first = h.service.verify_otp(PHONE, &wrong, None).await;
    assert!(matches!(
        first,
        Err(DomainError::Otp(OtpError::InvalidCode {
            remaining_attempts: 2
        }))
    ));
    let second = h.service.verify_otp(PHONE, &wrong, None).await;
    assert!(matches!(
        second,
        Err(DomainError::Otp(OtpError::InvalidCode {
            remaining_attempts: 1
        }))
    ));
    let third = h.service.verify_otp(PHONE, &wrong, None).await;
    assert!(matches!(
        third,
        Err(DomainError::Otp(OtpError::Locked {
            retry_after_minutes: 30
        }))
    ));

    // The correct code no longer helps
    let correct = h.service.verify_otp(PHONE, &code, None).await;
    assert!(matches!(
        correct,
        Err(DomainError::Otp(OtpError::Locked { .. }))
    ));
    let regenerate = h.service.generate_and_send_otp(PHONE, None, None).await;
    assert!(matches!(
        regenerate,
        Err(DomainError::Otp(OtpError::Locked { .. }))
    ));

    // Still locked on the last instant of the lockout
    h.clock.advance(Duration::seconds(1800));
    let at_boundary = h.service.verify_otp(PHONE, &code, None).await;
    assert!(matches!(
        at_boundary,
        Err(DomainError::Otp(OtpError::Locked {
            retry_after_minutes: 1
        }))
    ));

    h.clock.advance(Duration::milliseconds(1));
    let lapsed = h.service.verify_otp(PHONE, &code, None).await;
    assert!(matches!(lapsed, Err(DomainError::Otp(OtpError::NotFound))));

    let fresh = issue(&h, PHONE).await;
    assert!(h.service.verify_otp(PHONE, &fresh, None).await.is_ok());
}

#[tokio::test]
async fn test_correct_code_on_final_attempt_succeeds() {
    let h = harness();
    let code = issue(&h, PHONE).await;
    let wrong = wrong_code(&code);

    for _ in 0..2 {
        assert!(h.service.verify_otp(PHONE, &wrong, None).await.is_err());
    }

    assert!(h.service.verify_otp(PHONE, &code, None).await.is_ok());
}

#[tokio::test]
async fn test_expiry_boundary() {
    let h = harness();
    let start = h.clock.now();

    let on_time = issue(&h, PHONE).await;
    h.clock.set(start + Duration::seconds(300));
    assert!(h.service.verify_otp(PHONE, &on_time, None).await.is_ok());

    let other = "+251911000001";
    h.clock.set(start);
    let late = issue(&h, other).await;
    h.clock.set(start + Duration::seconds(300) + Duration::milliseconds(1));
    let expired = h.service.verify_otp(other, &late, None).await;
    assert!(matches!(expired, Err(DomainError::Otp(OtpError::Expired))));

    let again = h.service.verify_otp(other, &late, None).await;
    assert!(matches!(again, Err(DomainError::Otp(OtpError::NotFound))));
}

#[tokio::test]
async fn test_sms_failure_still_issues_code() {
    let h = harness_with(test_config(), GatewayBehaviour::Fail);

    let dispatch = h
        .service
        .generate_and_send_otp(PHONE, None, None)
        .await
        .unwrap();

    assert!(!dispatch.sent);
    let info = dispatch.provider_info.unwrap();
    assert!(info.contains("502"));

    let code = dispatch.dev_code.unwrap();
    assert!(!info.contains(&code));
    assert!(h.service.verify_otp(PHONE, &code, None).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_sms_timeout_reports_not_sent() {
    let config = OtpServiceConfig {
        sms_timeout: StdDuration::from_millis(50),
        ..test_config()
    };
    let h = harness_with(config, GatewayBehaviour::Hang);

    let dispatch = h
        .service
        .generate_and_send_otp(PHONE, None, None)
        .await
        .unwrap();

    assert!(!dispatch.sent);
    assert!(dispatch.provider_info.unwrap().contains("timed out"));
    assert_eq!(h.store.records_for(&OtpKey::phone(PHONE)).await.len(), 1);
}

#[tokio::test]
async fn test_dev_fixed_code_and_exposure() {
    let config = OtpServiceConfig {
        dev_fixed_code: Some("123456".into()),
        expose_code: false,
        ..Default::default()
    };
    let h = harness_with(config, GatewayBehaviour::Accept);

    let dispatch = h
        .service
        .generate_and_send_otp(PHONE, None, None)
        .await
        .unwrap();

    assert!(dispatch.dev_code.is_none());
    assert!(h.sms.last_message().unwrap().contains("123456"));
    assert!(h.service.verify_otp(PHONE, "123456", None).await.is_ok());
}

#[tokio::test]
async fn test_leading_zero_codes_keep_their_width() {
    let config = OtpServiceConfig {
        dev_fixed_code: Some("004271".into()),
        ..test_config()
    };
    let h = harness_with(config, GatewayBehaviour::Accept);
    issue(&h, PHONE).await;

    let short = h.service.verify_otp(PHONE, "4271", None).await;
    assert!(matches!(
        short,
        Err(DomainError::Otp(OtpError::InvalidCode { .. }))
    ));
    assert!(h.service.verify_otp(PHONE, "004271", None).await.is_ok());
}

#[test]
fn test_random_codes_are_fixed_width() {
    for code_length in [4u32, 6, 8] {
        let config = OtpServiceConfig {
            code_length,
            ..test_config()
        };
        let h = harness_with(config, GatewayBehaviour::Accept);
        for _ in 0..500 {
            let code = h.service.next_code();
            assert_eq!(code.len(), code_length as usize);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }
}

#[tokio::test]
async fn test_custom_message_template() {
    let config = OtpServiceConfig {
        dev_fixed_code: Some("654321".into()),
        ..test_config()
    };
    let h = harness_with(config, GatewayBehaviour::Accept);

    h.service
        .generate_and_send_otp(PHONE, None, Some("Code {code}, valid {minutes} min"))
        .await
        .unwrap();

    assert_eq!(
        h.sms.last_message().as_deref(),
        Some("Code 654321, valid 5 min")
    );
}

#[tokio::test]
async fn test_scoped_and_unscoped_codes_are_independent() {
    let h = harness();
    let scope = OtpReference::new("verification_request", "42");

    let plain = issue(&h, PHONE).await;
    let scoped = h
        .service
        .generate_and_send_otp(PHONE, Some(scope.clone()), None)
        .await
        .unwrap()
        .dev_code
        .unwrap();

    assert!(h
        .service
        .verify_otp(PHONE, &scoped, Some(scope.clone()))
        .await
        .is_ok());

    let scoped_again = h.service.verify_otp(PHONE, &scoped, Some(scope)).await;
    assert!(matches!(
        scoped_again,
        Err(DomainError::Otp(OtpError::NotFound))
    ));

    // The unscoped code is untouched by the scoped verification
    let unscoped = h.store.records_for(&OtpKey::phone(PHONE)).await;
    assert_eq!(unscoped.len(), 1);
    assert_eq!(unscoped[0].attempts, 0);
    assert!(h.service.verify_otp(PHONE, &plain, None).await.is_ok());
}

#[tokio::test]
async fn test_resend_requires_previous_code() {
    let h = harness();

    let nothing = h.service.resend_otp(PHONE, None).await;
    assert!(matches!(
        nothing,
        Err(DomainError::Otp(OtpError::NothingToResend))
    ));

    issue(&h, PHONE).await;
    let too_soon = h.service.resend_otp(PHONE, None).await;
    assert!(matches!(
        too_soon,
        Err(DomainError::Otp(OtpError::RateLimited { .. }))
    ));

    h.clock.advance(Duration::seconds(30));
    let resent = h.service.resend_otp("0911000000", None).await.unwrap();
    assert!(resent.sent);
    assert_eq!(h.sms.messages().len(), 2);
}

#[tokio::test]
async fn test_cleanup_removes_records_past_retention() {
    let h = harness();
    let code = issue(&h, PHONE).await;
    h.service.verify_otp(PHONE, &code, None).await.unwrap();
    issue(&h, "+251911000001").await;

    // A verified code goes on the next sweep
    assert_eq!(h.service.cleanup_expired_otps().await.unwrap(), 1);
    assert!(h.store.records_for(&OtpKey::phone(PHONE)).await.is_empty());
    assert_eq!(h.store.len().await, 1);

    h.clock.advance(Duration::seconds(300 + 86_400 - 1));
    assert_eq!(h.service.cleanup_expired_otps().await.unwrap(), 0);

    h.clock.advance(Duration::seconds(2));
    assert_eq!(h.service.cleanup_expired_otps().await.unwrap(), 1);
    assert!(h.store.is_empty().await);
}
