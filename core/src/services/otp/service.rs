//! Main OTP service implementation

use acct_shared::phone::{mask_phone_number, PhoneNormalizer};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, Rng};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::entities::otp::{OtpKey, OtpRecord, OtpReference, OtpStatus};
use crate::errors::{DomainResult, OtpError};
use crate::repositories::OtpStore;
use crate::services::hashing::{hash_otp, otp_matches};

use super::config::OtpServiceConfig;
use super::traits::SmsGateway;
use super::types::{OtpDispatch, OtpVerified};

/// Issues and verifies one-time codes bound to a phone number
pub struct OtpService {
    store: Arc<dyn OtpStore>,
    sms: Arc<dyn SmsGateway>,
    clock: Arc<dyn Clock>,
    normalizer: PhoneNormalizer,
    config: OtpServiceConfig,
}

impl OtpService {
    /// Create a new OTP service
    ///
    /// # Arguments
    ///
    /// * `store` - OTP record persistence
    /// * `sms` - SMS gateway used for delivery
    /// * `clock` - Time source
    /// * `normalizer` - Phone normalizer with the deployment's default country code
    /// * `config` - Service configuration
    pub fn new(
        store: Arc<dyn OtpStore>,
        sms: Arc<dyn SmsGateway>,
        clock: Arc<dyn Clock>,
        normalizer: PhoneNormalizer,
        config: OtpServiceConfig,
    ) -> Self {
        Self {
            store,
            sms,
            clock,
            normalizer,
            config,
        }
    }

    pub fn config(&self) -> &OtpServiceConfig {
        &self.config
    }

    /// Canonical form of a phone number, or `InvalidPhone`
    pub fn normalize_phone(&self, phone: &str) -> DomainResult<String> {
        Ok(self.normalizer.normalize(phone)?)
    }

    /// Generate a code, store its digest and send it by SMS
    ///
    /// This method:
    /// 1. Normalizes the phone number
    /// 2. Rejects the call while a lockout or the resend cooldown is running
    /// 3. Purges finished records for the key
    /// 4. Replaces any pending record with a new one
    /// 5. Sends the code; delivery failure is reported, never raised
    ///
    /// # Returns
    ///
    /// * `Ok(OtpDispatch)` - The code is issued (whether or not the SMS went out)
    /// * `Err(DomainError)` - Invalid phone, `RateLimited`, `Locked` or store failure
    pub async fn generate_and_send_otp(
        &self,
        phone: &str,
        reference: Option<OtpReference>,
        message_template: Option<&str>,
    ) -> DomainResult<OtpDispatch> {
        let phone = self.normalize_phone(phone)?;
        let key = OtpKey::new(phone.clone(), reference);
        let now = self.clock.now();
        let masked = mask_phone_number(&phone);

        if let Some(active) = self.store.find_active(&key).await? {
            if active.is_lockout_active(now) {
                let retry_after_minutes = minutes_until(now, active.expires_at);
                tracing::warn!(
                    phone = %masked,
                    retry_after_minutes,
                    event = "otp_request_while_locked",
                    "OTP requested for a locked phone number"
                );
                return Err(OtpError::Locked { retry_after_minutes }.into());
            }

            if active.status == OtpStatus::Pending {
                let cooldown_ends = active.cooldown_ends_at(Duration::seconds(self.config.cooldown_seconds));
                if now < cooldown_ends {
                    let retry_after_seconds = seconds_until(now, cooldown_ends);
                    tracing::warn!(
                        phone = %masked,
                        retry_after_seconds,
                        event = "rate_limit_exceeded",
                        "OTP request rate limit exceeded"
                    );
                    return Err(OtpError::RateLimited { retry_after_seconds }.into());
                }
            }
        }

        let purged = self.store.delete_stale_for_key(&key, now).await?;
        if purged > 0 {
            tracing::debug!(phone = %masked, purged, "Purged finished OTP records");
        }

        let code = self.next_code();
        let expires_at = now + Duration::seconds(self.config.expiration_seconds);
        let record = self
            .store
            .replace_pending(OtpRecord::new(&key, hash_otp(&code), now, expires_at))
            .await?;

        tracing::info!(
            phone = %masked,
            otp_id = %record.id,
            scoped = key.reference.is_some(),
            event = "otp_generated",
            "Generated new OTP"
        );

        let template = message_template.unwrap_or(&self.config.message_template);
        let message = render_message(template, &code, self.config.expiration_seconds);
        let (sent, provider_info) = self.deliver(&phone, &message).await;

        Ok(OtpDispatch {
            sent,
            expires_in: self.config.expiration_seconds,
            provider_info,
            dev_code: self.config.expose_code.then_some(code),
        })
    }

    /// Issue a fresh code for a key that already had one
    ///
    /// Fails with `NothingToResend` when no record was ever issued for the key;
    /// otherwise behaves exactly like [`Self::generate_and_send_otp`].
    pub async fn resend_otp(
        &self,
        phone: &str,
        reference: Option<OtpReference>,
    ) -> DomainResult<OtpDispatch> {
        let canonical = self.normalize_phone(phone)?;
        let key = OtpKey::new(canonical.clone(), reference.clone());
        if self.store.find_latest(&key).await?.is_none() {
            return Err(OtpError::NothingToResend.into());
        }
        self.generate_and_send_otp(&canonical, reference, None).await
    }

    /// Verify a submitted code
    ///
    /// Every call that reaches a pending, unexpired record increments its
    /// attempt counter exactly once. A correct code on the final allowed
    /// attempt still succeeds.
    ///
    /// # Returns
    ///
    /// * `Ok(OtpVerified)` - Code matched; the record is consumed
    /// * `Err(DomainError)` - `NotFound`, `Expired`, `InvalidCode` or `Locked`
    pub async fn verify_otp(
        &self,
        phone: &str,
        code: &str,
        reference: Option<OtpReference>,
    ) -> DomainResult<OtpVerified> {
        let phone = self.normalize_phone(phone)?;
        let key = OtpKey::new(phone.clone(), reference);
        let now = self.clock.now();
        let masked = mask_phone_number(&phone);

        let record = self
            .store
            .find_active(&key)
            .await?
            .ok_or(OtpError::NotFound)?;

        if record.status == OtpStatus::Locked {
            if record.is_lockout_active(now) {
                return Err(OtpError::Locked {
                    retry_after_minutes: minutes_until(now, record.expires_at),
                }
                .into());
            }
            // Lockout lapsed; no live code remains for this key
            self.store.delete(record.id).await?;
            return Err(OtpError::NotFound.into());
        }

        if record.is_expired_at(now) {
            self.store
                .transition(record.id, OtpStatus::Pending, OtpStatus::Expired, None, now)
                .await?;
            tracing::info!(phone = %masked, otp_id = %record.id, event = "otp_expired", "OTP expired");
            return Err(OtpError::Expired.into());
        }

        let attempts = self
            .store
            .increment_attempts(record.id, now)
            .await?
            .ok_or(OtpError::NotFound)?;

        if otp_matches(code, &record.code_hash) {
            let consumed = self
                .store
                .transition(record.id, OtpStatus::Pending, OtpStatus::Verified, None, now)
                .await?;
            if !consumed {
                return Err(OtpError::NotFound.into());
            }
            self.store.delete_others_for_key(&key, record.id).await?;
            tracing::info!(
                phone = %masked,
                otp_id = %record.id,
                attempts,
                event = "otp_verified_success",
                "OTP verified"
            );
            return Ok(OtpVerified {
                phone,
                verified_at: now,
            });
        }

        if attempts >= self.config.max_attempts {
            let lockout_ends = now + Duration::seconds(self.config.lockout_seconds);
            self.store
                .transition(
                    record.id,
                    OtpStatus::Pending,
                    OtpStatus::Locked,
                    Some(lockout_ends),
                    now,
                )
                .await?;
            tracing::warn!(
                phone = %masked,
                otp_id = %record.id,
                attempts,
                event = "max_attempts_exceeded",
                "OTP locked after too many failed attempts"
            );
            return Err(OtpError::Locked {
                retry_after_minutes: minutes_until(now, lockout_ends),
            }
            .into());
        }

        let remaining_attempts = self.config.max_attempts - attempts;
        tracing::warn!(
            phone = %masked,
            otp_id = %record.id,
            remaining_attempts,
            event = "otp_verification_failed",
            "OTP verification failed"
        );
        Err(OtpError::InvalidCode { remaining_attempts }.into())
    }

    /// Delete consumed records and those that expired more than the
    /// retention window ago
    pub async fn cleanup_expired_otps(&self) -> DomainResult<u64> {
        let cutoff = self.clock.now() - Duration::seconds(self.config.retention_seconds);
        let deleted = self.store.delete_expired_before(cutoff).await?;
        tracing::info!(deleted, event = "otp_cleanup", "Deleted expired OTP records");
        Ok(deleted)
    }

    /// Uniform code from the OS CSPRNG, zero-padded to the configured width
    pub(super) fn next_code(&self) -> String {
        if let Some(code) = &self.config.dev_fixed_code {
            return code.clone();
        }
        let width = self.config.code_length as usize;
        let upper = 10u64.pow(self.config.code_length);
        let value = OsRng.gen_range(0..upper);
        format!("{:0width$}", value, width = width)
    }

    /// Send within the configured timeout; returns `(sent, provider_info)`
    async fn deliver(&self, phone: &str, message: &str) -> (bool, Option<String>) {
        let masked = mask_phone_number(phone);
        let provider = self.sms.provider_name().to_string();

        match tokio::time::timeout(self.config.sms_timeout, self.sms.send_sms(phone, message)).await
        {
            Ok(Ok(receipt)) => {
                tracing::info!(
                    phone = %masked,
                    provider = %provider,
                    event = "otp_sms_sent",
                    "OTP SMS accepted by gateway"
                );
                (true, Some(receipt.describe()))
            }
            Ok(Err(err)) => {
                tracing::error!(
                    phone = %masked,
                    provider = %provider,
                    error = %err,
                    event = "otp_sms_failed",
                    "OTP SMS delivery failed"
                );
                (false, Some(err.to_string()))
            }
            Err(_) => {
                tracing::error!(
                    phone = %masked,
                    provider = %provider,
                    timeout_ms = self.config.sms_timeout.as_millis() as u64,
                    event = "otp_sms_timeout",
                    "OTP SMS delivery timed out"
                );
                (
                    false,
                    Some(format!(
                        "SMS gateway timed out after {}ms",
                        self.config.sms_timeout.as_millis()
                    )),
                )
            }
        }
    }
}

/// Substitute `{code}` and `{minutes}` into an SMS template
pub fn render_message(template: &str, code: &str, expiration_seconds: i64) -> String {
    let minutes = ((expiration_seconds + 59) / 60).max(1);
    template
        .replace("{code}", code)
        .replace("{minutes}", &minutes.to_string())
}

/// Whole seconds until `until`, rounded up, at least 1
fn seconds_until(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let millis = (until - now).num_milliseconds();
    ((millis + 999) / 1000).max(1)
}

/// Whole minutes until `until`, rounded up, at least 1
fn minutes_until(now: DateTime<Utc>, until: DateTime<Utc>) -> i64 {
    let seconds = seconds_until(now, until);
    ((seconds + 59) / 60).max(1)
}
