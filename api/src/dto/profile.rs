use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use acct_core::domain::entities::profile::{Profile, ProfileUpdate};

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[validate(url, length(max = 2048))]
    pub avatar_url: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(length(max = 255))]
    pub address: Option<String>,
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[validate(length(max = 100))]
    pub country: Option<String>,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(request: UpdateProfileRequest) -> Self {
        ProfileUpdate {
            first_name: request.first_name,
            last_name: request.last_name,
            display_name: request.display_name,
            bio: request.bio,
            avatar_url: request.avatar_url,
            date_of_birth: request.date_of_birth,
            gender: request.gender,
            address: request.address,
            city: request.city,
            country: request.country,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.user_id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            display_name: profile.display_name,
            bio: profile.bio,
            avatar_url: profile.avatar_url,
            date_of_birth: profile.date_of_birth,
            gender: profile.gender,
            address: profile.address,
            city: profile.city,
            country: profile.country,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }
}
