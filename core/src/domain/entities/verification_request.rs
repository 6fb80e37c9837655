//! Document verification requests reviewed by administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What the submitted document proves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationType {
    Identity,
    Address,
    Business,
    Other,
}

impl VerificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationType::Identity => "identity",
            VerificationType::Address => "address",
            VerificationType::Business => "business",
            VerificationType::Other => "other",
        }
    }
}

impl std::str::FromStr for VerificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" | "id" => Ok(VerificationType::Identity),
            "address" => Ok(VerificationType::Address),
            "business" => Ok(VerificationType::Business),
            "other" => Ok(VerificationType::Other),
            other => Err(format!("Unknown verification type: {}", other)),
        }
    }
}

/// Review state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for VerificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(VerificationStatus::Pending),
            "approved" => Ok(VerificationStatus::Approved),
            "rejected" => Ok(VerificationStatus::Rejected),
            other => Err(format!("Unknown verification status: {}", other)),
        }
    }
}

/// A user's request to have a document verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub verification_type: VerificationType,
    /// Location of the already-uploaded document
    pub document_url: String,
    pub notes: Option<String>,
    pub status: VerificationStatus,
    pub reviewer_id: Option<Uuid>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VerificationRequest {
    pub fn new(
        user_id: Uuid,
        verification_type: VerificationType,
        document_url: String,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            verification_type,
            document_url,
            notes,
            status: VerificationStatus::Pending,
            reviewer_id: None,
            review_notes: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == VerificationStatus::Pending
    }
}
