//! Profile repository trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::profile::Profile;
use crate::errors::DomainError;

/// One profile row per user
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError>;

    /// Insert or replace the user's profile
    async fn upsert(&self, profile: Profile) -> Result<Profile, DomainError>;
}
