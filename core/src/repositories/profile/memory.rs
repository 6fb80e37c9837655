//! In-memory profile repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::profile::Profile;
use crate::errors::DomainError;

use super::trait_::ProfileRepository;

#[derive(Clone, Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<Uuid, Profile>>>,
}

impl InMemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, DomainError> {
        let mut profiles = self.profiles.write().await;
        // created_at survives replacement
        let stored = match profiles.get(&profile.user_id) {
            Some(existing) => Profile {
                created_at: existing.created_at,
                ..profile
            },
            None => profile,
        };
        profiles.insert(stored.user_id, stored.clone());
        Ok(stored)
    }
}
