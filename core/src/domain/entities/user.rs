//! User and role entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role granted to every registered user
pub const ROLE_USER: &str = "user";

/// Role allowed to review verification requests and manage roles
pub const ROLE_ADMIN: &str = "admin";

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Optional unique login name
    pub username: Option<String>,

    /// Optional unique email (stored lowercase)
    pub email: Option<String>,

    /// Optional unique phone number in canonical form
    pub phone: Option<String>,

    /// bcrypt hash of the password; phone-only accounts have none
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// Inactive accounts cannot log in
    pub is_active: bool,

    /// Whether the user's phone number has been verified by OTP
    pub is_verified: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,

    /// Timestamp of the user's last login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates a new active, unverified user
    pub fn new(
        username: Option<String>,
        email: Option<String>,
        phone: Option<String>,
        password_hash: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email: email.map(|e| e.to_lowercase()),
            phone,
            password_hash,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Marks the user's phone as verified
    pub fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.is_verified = true;
        self.updated_at = now;
    }

    /// Updates the last login timestamp
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Deactivate the account
    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated_at = now;
    }
}

/// Named role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Role {
    pub fn new(name: impl Into<String>, description: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description,
            created_at: now,
        }
    }
}
