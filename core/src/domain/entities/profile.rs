//! User profile entity.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One profile per user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
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

/// Partial profile update; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
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
}

/// Profile fields embedded in access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Profile {
    /// Empty profile created alongside a new user
    pub fn empty(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            first_name: None,
            last_name: None,
            display_name: None,
            bio: None,
            avatar_url: None,
            date_of_birth: None,
            gender: None,
            address: None,
            city: None,
            country: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merge an update into the profile
    pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if update.$field.is_some() { self.$field = update.$field; })*
            };
        }
        merge!(
            first_name,
            last_name,
            display_name,
            bio,
            avatar_url,
            date_of_birth,
            gender,
            address,
            city,
            country
        );
        self.updated_at = now;
    }

    /// Fields carried in access tokens
    pub fn snapshot(&self) -> ProfileSnapshot {
        let display_name = self.display_name.clone().or_else(|| {
            match (&self.first_name, &self.last_name) {
                (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
                (Some(first), None) => Some(first.clone()),
                (None, Some(last)) => Some(last.clone()),
                (None, None) => None,
            }
        });
        ProfileSnapshot {
            display_name,
            avatar_url: self.avatar_url.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
        }
    }
}
