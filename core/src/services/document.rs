//! Document verification workflow
//!
//! Users submit a link to an already-uploaded document; administrators approve
//! or reject it. Only pending requests can be reviewed, and a user holds at
//! most one pending request per verification type.

use acct_shared::validation::{is_http_url, non_blank};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::verification_request::{
    VerificationRequest, VerificationStatus, VerificationType,
};
use crate::errors::{AuthError, DomainError, DomainResult, ValidationError};
use crate::repositories::{UserRepository, VerificationRequestRepository};

const NOTES_MAX_LENGTH: usize = 1000;
const URL_MAX_LENGTH: usize = 2048;

pub struct DocumentVerificationService {
    requests: Arc<dyn VerificationRequestRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl DocumentVerificationService {
    pub fn new(
        requests: Arc<dyn VerificationRequestRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            requests,
            users,
            clock,
        }
    }

    /// File a new request
    ///
    /// # Returns
    ///
    /// * `Ok(VerificationRequest)` - The stored pending request
    /// * `Err(DomainError)` - Invalid URL or notes, unknown user, or a pending
    ///   request of the same type already exists
    pub async fn submit(
        &self,
        user_id: Uuid,
        verification_type: VerificationType,
        document_url: &str,
        notes: Option<String>,
    ) -> DomainResult<VerificationRequest> {
        let document_url = document_url.trim();
        if document_url.is_empty() {
            return Err(ValidationError::RequiredField {
                field: "documentUrl".to_string(),
            }
            .into());
        }
        if document_url.len() > URL_MAX_LENGTH || !is_http_url(document_url) {
            return Err(ValidationError::InvalidFormat {
                field: "documentUrl".to_string(),
            }
            .into());
        }
        let notes = validate_notes(notes)?;

        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(AuthError::UserNotFound.into());
        }

        let request = self
            .requests
            .create(VerificationRequest::new(
                user_id,
                verification_type,
                document_url.to_string(),
                notes,
                self.clock.now(),
            ))
            .await?;

        tracing::info!(
            user_id = %user_id,
            request_id = %request.id,
            verification_type = verification_type.as_str(),
            event = "verification_submitted",
            "Verification request submitted"
        );
        Ok(request)
    }

    /// The user's own requests, newest first
    pub async fn list_for_user(&self, user_id: Uuid) -> DomainResult<Vec<VerificationRequest>> {
        self.requests.list_for_user(user_id).await
    }

    /// All requests, optionally filtered by status
    pub async fn list(
        &self,
        status: Option<VerificationStatus>,
    ) -> DomainResult<Vec<VerificationRequest>> {
        self.requests.list(status).await
    }

    /// Approve or reject a pending request
    pub async fn review(
        &self,
        id: Uuid,
        reviewer_id: Uuid,
        status: VerificationStatus,
        review_notes: Option<String>,
    ) -> DomainResult<VerificationRequest> {
        let review_notes = validate_notes(review_notes)?;
        if status == VerificationStatus::Pending {
            return Err(invalid_transition(VerificationStatus::Pending, status));
        }

        let current = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("verification request"))?;
        if !current.is_pending() {
            return Err(invalid_transition(current.status, status));
        }

        let reviewed = self
            .requests
            .complete_review(id, status, reviewer_id, review_notes, self.clock.now())
            .await?
            // Another reviewer got there first
            .ok_or_else(|| invalid_transition(current.status, status))?;

        tracing::info!(
            request_id = %id,
            reviewer_id = %reviewer_id,
            status = status.as_str(),
            event = "verification_reviewed",
            "Verification request reviewed"
        );
        Ok(reviewed)
    }
}

fn validate_notes(notes: Option<String>) -> DomainResult<Option<String>> {
    let notes = non_blank(notes);
    if notes
        .as_ref()
        .map_or(false, |n| n.chars().count() > NOTES_MAX_LENGTH)
    {
        return Err(ValidationError::InvalidLength {
            field: "notes".to_string(),
            min: 1,
            max: NOTES_MAX_LENGTH,
        }
        .into());
    }
    Ok(notes)
}

fn invalid_transition(from: VerificationStatus, to: VerificationStatus) -> DomainError {
    ValidationError::InvalidStatusTransition {
        from: from.as_str().to_string(),
        to: to.as_str().to_string(),
    }
    .into()
}
