//! One-time password records.
//!
//! A record is keyed by the canonical phone number plus an optional
//! `(reference_type, reference_id)` scope. Only the SHA-256 digest of the
//! code is stored.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an OTP record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpStatus {
    /// Issued and awaiting verification
    Pending,
    /// Successfully verified (terminal)
    Verified,
    /// Verified too late (terminal)
    Expired,
    /// Too many wrong codes; `expires_at` holds the end of the lockout
    Locked,
}

impl OtpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpStatus::Pending => "pending",
            OtpStatus::Verified => "verified",
            OtpStatus::Expired => "expired",
            OtpStatus::Locked => "locked",
        }
    }
}

impl std::fmt::Display for OtpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OtpStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OtpStatus::Pending),
            "verified" => Ok(OtpStatus::Verified),
            "expired" => Ok(OtpStatus::Expired),
            "locked" => Ok(OtpStatus::Locked),
            other => Err(format!("Unknown OTP status: {}", other)),
        }
    }
}

/// Optional scope tying an OTP to another entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OtpReference {
    pub reference_type: String,
    pub reference_id: String,
}

impl OtpReference {
    pub fn new(reference_type: impl Into<String>, reference_id: impl Into<String>) -> Self {
        Self {
            reference_type: reference_type.into(),
            reference_id: reference_id.into(),
        }
    }
}

/// Lookup key: canonical phone plus optional scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OtpKey {
    pub phone: String,
    pub reference: Option<OtpReference>,
}

impl OtpKey {
    pub fn new(phone: impl Into<String>, reference: Option<OtpReference>) -> Self {
        Self {
            phone: phone.into(),
            reference,
        }
    }

    /// Unscoped key for a phone number
    pub fn phone(phone: impl Into<String>) -> Self {
        Self::new(phone, None)
    }

    /// Stable string form, used for the pending uniqueness index
    pub fn storage_key(&self) -> String {
        match &self.reference {
            Some(reference) => format!(
                "{}|{}|{}",
                self.phone, reference.reference_type, reference.reference_id
            ),
            None => self.phone.clone(),
        }
    }
}

/// Persisted OTP record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    pub id: Uuid,
    pub phone: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<String>,
    /// Hex SHA-256 digest of the code
    pub code_hash: String,
    pub attempts: u32,
    pub status: OtpStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OtpRecord {
    /// New pending record with zero attempts
    pub fn new(
        key: &OtpKey,
        code_hash: String,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        let (reference_type, reference_id) = match &key.reference {
            Some(reference) => (
                Some(reference.reference_type.clone()),
                Some(reference.reference_id.clone()),
            ),
            None => (None, None),
        };
        Self {
            id: Uuid::new_v4(),
            phone: key.phone.clone(),
            reference_type,
            reference_id,
            code_hash,
            attempts: 0,
            status: OtpStatus::Pending,
            created_at: now,
            expires_at,
            updated_at: now,
        }
    }

    /// Key this record belongs to
    pub fn key(&self) -> OtpKey {
        let reference = match (&self.reference_type, &self.reference_id) {
            (Some(reference_type), Some(reference_id)) => {
                Some(OtpReference::new(reference_type, reference_id))
            }
            _ => None,
        };
        OtpKey::new(self.phone.clone(), reference)
    }

    pub fn matches_key(&self, key: &OtpKey) -> bool {
        self.phone == key.phone
            && match &key.reference {
                Some(reference) => {
                    self.reference_type.as_deref() == Some(reference.reference_type.as_str())
                        && self.reference_id.as_deref() == Some(reference.reference_id.as_str())
                }
                None => self.reference_type.is_none() && self.reference_id.is_none(),
            }
    }

    /// Pending or locked
    pub fn is_active(&self) -> bool {
        matches!(self.status, OtpStatus::Pending | OtpStatus::Locked)
    }

    /// Locked and the lockout window still running (`now == expires_at` still locked)
    pub fn is_lockout_active(&self, now: DateTime<Utc>) -> bool {
        self.status == OtpStatus::Locked && now <= self.expires_at
    }

    /// Past expiry; `now == expires_at` is still valid
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Safe to purge during housekeeping for its key
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        match self.status {
            OtpStatus::Verified | OtpStatus::Expired => true,
            OtpStatus::Locked => now > self.expires_at,
            OtpStatus::Pending => false,
        }
    }

    /// When the next generation for this key becomes allowed
    pub fn cooldown_ends_at(&self, cooldown: Duration) -> DateTime<Utc> {
        self.created_at + cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &OtpKey) -> OtpRecord {
        let now = Utc::now();
        OtpRecord::new(key, "digest".into(), now, now + Duration::seconds(300))
    }

    #[test]
    fn test_scoped_and_unscoped_keys_are_distinct() {
        let unscoped = OtpKey::phone("+251911000000");
        let scoped = OtpKey::new(
            "+251911000000",
            Some(OtpReference::new("verification_request", "42")),
        );

        let unscoped_record = record(&unscoped);
        let scoped_record = record(&scoped);

        assert!(unscoped_record.matches_key(&unscoped));
        assert!(!unscoped_record.matches_key(&scoped));
        assert!(scoped_record.matches_key(&scoped));
        assert!(!scoped_record.matches_key(&unscoped));
        assert_eq!(scoped_record.key(), scoped);
        assert_ne!(scoped.storage_key(), unscoped.storage_key());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let key = OtpKey::phone("+251911000000");
        let rec = record(&key);
        assert!(!rec.is_expired_at(rec.expires_at));
        assert!(rec.is_expired_at(rec.expires_at + Duration::milliseconds(1)));
    }

    #[test]
    fn test_stale_records() {
        let key = OtpKey::phone("+251911000000");
        let mut rec = record(&key);
        let now = rec.created_at;
        assert!(!rec.is_stale(now));

        rec.status = OtpStatus::Locked;
        assert!(!rec.is_stale(now));
        assert!(rec.is_stale(rec.expires_at + Duration::seconds(1)));

        rec.status = OtpStatus::Verified;
        assert!(rec.is_stale(now));
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            OtpStatus::Pending,
            OtpStatus::Verified,
            OtpStatus::Expired,
            OtpStatus::Locked,
        ] {
            assert_eq!(status.as_str().parse::<OtpStatus>(), Ok(status));
        }
    }
}
