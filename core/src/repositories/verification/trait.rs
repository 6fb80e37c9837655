//! Document verification request repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::verification_request::{VerificationRequest, VerificationStatus};
use crate::errors::DomainError;

/// Persistence for verification requests
#[async_trait]
pub trait VerificationRequestRepository: Send + Sync {
    /// Insert a pending request
    ///
    /// Fails with `ValidationError::DuplicatePendingRequest` when the user
    /// already has a pending request of the same type.
    async fn create(&self, request: VerificationRequest) -> Result<VerificationRequest, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VerificationRequest>, DomainError>;

    /// A user's requests, newest first
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<VerificationRequest>, DomainError>;

    /// All requests, optionally filtered by status, newest first
    async fn list(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<VerificationRequest>, DomainError>;

    /// Record a review decision on a pending request
    ///
    /// # Returns
    /// * `Ok(Some(request))` - The updated request
    /// * `Ok(None)` - The request was no longer pending
    async fn complete_review(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reviewer_id: Uuid,
        review_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationRequest>, DomainError>;
}
