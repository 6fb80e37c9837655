use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use acct_core::domain::entities::verification_request::{
    VerificationRequest, VerificationStatus, VerificationType,
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVerificationRequest {
    pub verification_type: VerificationType,
    #[validate(length(min = 1, max = 2048))]
    pub document_url: String,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewVerificationRequest {
    pub status: VerificationStatus,
    #[validate(length(max = 1000))]
    pub review_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerificationListQuery {
    pub status: Option<VerificationStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub verification_type: VerificationType,
    pub document_url: String,
    pub notes: Option<String>,
    pub status: VerificationStatus,
    pub reviewer_id: Option<Uuid>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VerificationRequest> for VerificationResponse {
    fn from(request: VerificationRequest) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            verification_type: request.verification_type,
            document_url: request.document_url,
            notes: request.notes,
            status: request.status,
            reviewer_id: request.reviewer_id,
            review_notes: request.review_notes,
            reviewed_at: request.reviewed_at,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}
