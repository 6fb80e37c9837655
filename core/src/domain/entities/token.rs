//! Token entities for JWT-based authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::ProfileSnapshot;

/// `token_type` claim of access tokens
pub const ACCESS_TOKEN_TYPE: &str = "access";

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Role names held when the token was issued
    #[serde(default)]
    pub roles: Vec<String>,

    /// Profile snapshot at issue time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSnapshot>,

    /// Whether the user's phone is verified
    pub is_verified: bool,

    /// Always `access`
    pub token_type: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID
    pub jti: String,
}

impl Claims {
    /// Parse the subject as a user id
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Identity bundle an access token is signed for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessTokenSubject {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub roles: Vec<String>,
    pub profile: Option<ProfileSnapshot>,
    pub is_verified: bool,
}

/// Persisted refresh token; only the bcrypt hash of the secret is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshTokenRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    /// Forward pointer set when the token is rotated
    pub replaced_by_token_id: Option<Uuid>,
    /// Opaque client metadata (user agent, ip)
    pub metadata: serde_json::Value,
}

impl RefreshTokenRecord {
    pub fn new(
        user_id: Uuid,
        token_hash: String,
        now: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            token_hash,
            created_at: now,
            expires_at,
            revoked_at: None,
            replaced_by_token_id: None,
            metadata,
        }
    }

    /// Valid iff not revoked and not yet expired
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }
}

/// Freshly issued refresh token; `raw_token` is never available again
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub raw_token: String,
    pub record: RefreshTokenRecord,
}

/// Access token plus refresh token handed to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_refresh_token_validity() {
        let now = Utc::now();
        let mut record = RefreshTokenRecord::new(
            Uuid::new_v4(),
            "hash".into(),
            now,
            now + Duration::days(7),
            serde_json::Value::Null,
        );
        assert!(record.is_valid_at(now));
        assert!(!record.is_valid_at(now + Duration::days(7)));

        record.revoked_at = Some(now);
        assert!(!record.is_valid_at(now));
        assert!(record.is_revoked());
    }

    #[test]
    fn test_claims_role_lookup() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: None,
            email: None,
            phone: None,
            roles: vec!["user".into(), "admin".into()],
            profile: None,
            is_verified: true,
            token_type: ACCESS_TOKEN_TYPE.into(),
            iat: 0,
            nbf: 0,
            exp: 0,
            iss: "iss".into(),
            aud: "aud".into(),
            jti: "jti".into(),
        };
        assert!(claims.has_role("admin"));
        assert!(!claims.has_role("auditor"));
        assert!(claims.user_id().is_some());
    }
}
