//! In-memory verification request repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::verification_request::{VerificationRequest, VerificationStatus};
use crate::errors::{DomainError, ValidationError};

use super::trait_::VerificationRequestRepository;

#[derive(Clone, Default)]
pub struct InMemoryVerificationRequestRepository {
    requests: Arc<RwLock<Vec<VerificationRequest>>>,
}

impl InMemoryVerificationRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut requests: Vec<VerificationRequest>) -> Vec<VerificationRequest> {
    requests.sort_by_key(|r| std::cmp::Reverse(r.created_at));
    requests
}

#[async_trait]
impl VerificationRequestRepository for InMemoryVerificationRequestRepository {
    async fn create(&self, request: VerificationRequest) -> Result<VerificationRequest, DomainError> {
        let mut requests = self.requests.write().await;
        let duplicate = requests.iter().any(|r| {
            r.user_id == request.user_id
                && r.verification_type == request.verification_type
                && r.is_pending()
        });
        if duplicate {
            return Err(ValidationError::DuplicatePendingRequest {
                verification_type: request.verification_type.as_str().to_string(),
            }
            .into());
        }
        requests.push(request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VerificationRequest>, DomainError> {
        let requests = self.requests.read().await;
        Ok(requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<VerificationRequest>, DomainError> {
        let requests = self.requests.read().await;
        Ok(newest_first(
            requests.iter().filter(|r| r.user_id == user_id).cloned().collect(),
        ))
    }

    async fn list(
        &self,
        status: Option<VerificationStatus>,
    ) -> Result<Vec<VerificationRequest>, DomainError> {
        let requests = self.requests.read().await;
        Ok(newest_first(
            requests
                .iter()
                .filter(|r| status.map_or(true, |s| r.status == s))
                .cloned()
                .collect(),
        ))
    }

    async fn complete_review(
        &self,
        id: Uuid,
        status: VerificationStatus,
        reviewer_id: Uuid,
        review_notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<VerificationRequest>, DomainError> {
        let mut requests = self.requests.write().await;
        match requests.iter_mut().find(|r| r.id == id && r.is_pending()) {
            Some(request) => {
                request.status = status;
                request.reviewer_id = Some(reviewer_id);
                request.review_notes = review_notes;
                request.reviewed_at = Some(now);
                request.updated_at = now;
                Ok(Some(request.clone()))
            }
            None => Ok(None),
        }
    }
}
