//! Profile reads and partial updates

use acct_shared::validation::{is_http_url, non_blank};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::profile::{Profile, ProfileUpdate};
use crate::errors::{AuthError, DomainResult, ValidationError};
use crate::repositories::{ProfileRepository, UserRepository};

const NAME_MAX_LENGTH: usize = 100;
const TEXT_MAX_LENGTH: usize = 255;
const BIO_MAX_LENGTH: usize = 1000;

pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            profiles,
            users,
            clock,
        }
    }

    /// The user's profile; an empty one when none was stored yet
    pub async fn get(&self, user_id: Uuid) -> DomainResult<Profile> {
        if let Some(profile) = self.profiles.find_by_user(user_id).await? {
            return Ok(profile);
        }
        self.ensure_user(user_id).await?;
        Ok(Profile::empty(user_id, self.clock.now()))
    }

    /// Merge `update` into the stored profile, creating it if needed
    pub async fn update(&self, user_id: Uuid, update: ProfileUpdate) -> DomainResult<Profile> {
        let update = validate_update(update)?;
        self.ensure_user(user_id).await?;

        let now = self.clock.now();
        let mut profile = self
            .profiles
            .find_by_user(user_id)
            .await?
            .unwrap_or_else(|| Profile::empty(user_id, now));
        profile.apply(update, now);

        let saved = self.profiles.upsert(profile).await?;
        tracing::info!(user_id = %user_id, event = "profile_updated", "Profile updated");
        Ok(saved)
    }

    async fn ensure_user(&self, user_id: Uuid) -> DomainResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(AuthError::UserNotFound.into()),
        }
    }
}

/// Trim text fields, drop blanks and enforce length and URL rules
fn validate_update(update: ProfileUpdate) -> DomainResult<ProfileUpdate> {
    let update = ProfileUpdate {
        first_name: non_blank(update.first_name),
        last_name: non_blank(update.last_name),
        display_name: non_blank(update.display_name),
        bio: non_blank(update.bio),
        avatar_url: non_blank(update.avatar_url),
        date_of_birth: update.date_of_birth,
        gender: non_blank(update.gender),
        address: non_blank(update.address),
        city: non_blank(update.city),
        country: non_blank(update.country),
    };

    let limits = [
        ("firstName", &update.first_name, NAME_MAX_LENGTH),
        ("lastName", &update.last_name, NAME_MAX_LENGTH),
        ("displayName", &update.display_name, NAME_MAX_LENGTH),
        ("bio", &update.bio, BIO_MAX_LENGTH),
        ("avatarUrl", &update.avatar_url, TEXT_MAX_LENGTH),
        ("gender", &update.gender, NAME_MAX_LENGTH),
        ("address", &update.address, TEXT_MAX_LENGTH),
        ("city", &update.city, NAME_MAX_LENGTH),
        ("country", &update.country, NAME_MAX_LENGTH),
    ];
    for (field, value, max) in limits {
        if value.as_ref().map_or(false, |v| v.chars().count() > max) {
            return Err(ValidationError::InvalidLength {
                field: field.to_string(),
                min: 1,
                max,
            }
            .into());
        }
    }

    if let Some(url) = &update.avatar_url {
        if !is_http_url(url) {
            return Err(ValidationError::InvalidFormat {
                field: "avatarUrl".to_string(),
            }
            .into());
        }
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::entities::user::User;
    use crate::errors::DomainError;
    use crate::repositories::{InMemoryProfileRepository, InMemoryUserRepository};

    async fn setup() -> (ProfileService, Uuid) {
        let clock = Arc::new(ManualClock::default());
        let users = InMemoryUserRepository::new();
        let user = users
            .create(User::new(
                Some("abebe".into()),
                None,
                None,
                None,
                clock.now(),
            ))
            .await
            .unwrap();
        let service = ProfileService::new(
            Arc::new(InMemoryProfileRepository::new()),
            Arc::new(users),
            clock,
        );
        (service, user.id)
    }

    #[tokio::test]
    async fn test_get_returns_empty_profile_for_new_user() {
        let (service, user_id) = setup().await;
        let profile = service.get(user_id).await.unwrap();
        assert_eq!(profile.user_id, user_id);
        assert!(profile.first_name.is_none());

        assert!(matches!(
            service.get(Uuid::new_v4()).await,
            Err(DomainError::Auth(AuthError::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (service, user_id) = setup().await;

        service
            .update(
                user_id,
                ProfileUpdate {
                    first_name: Some(" Abebe ".into()),
                    avatar_url: Some("https://cdn.example.com/a.png".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let profile = service
            .update(
                user_id,
                ProfileUpdate {
                    city: Some("Addis Ababa".into()),
                    last_name: Some("   ".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.first_name.as_deref(), Some("Abebe"));
        assert_eq!(profile.city.as_deref(), Some("Addis Ababa"));
        assert!(profile.last_name.is_none());
        assert_eq!(service.get(user_id).await.unwrap(), profile);
    }

    #[tokio::test]
    async fn test_update_validates_fields() {
        let (service, user_id) = setup().await;

        let too_long = service
            .update(
                user_id,
                ProfileUpdate {
                    first_name: Some("a".repeat(101)),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            too_long,
            Err(DomainError::ValidationErr(ValidationError::InvalidLength { ref field, .. })) if field == "firstName"
        ));

        let bad_url = service
            .update(
                user_id,
                ProfileUpdate {
                    avatar_url: Some("ftp://example.com/a.png".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            bad_url,
            Err(DomainError::ValidationErr(ValidationError::InvalidFormat { ref field })) if field == "avatarUrl"
        ));
    }
}
