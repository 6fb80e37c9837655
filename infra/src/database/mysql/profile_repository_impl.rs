//! MySQL implementation of the ProfileRepository trait.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use acct_core::domain::entities::profile::Profile;
use acct_core::errors::DomainError;
use acct_core::repositories::ProfileRepository;

use super::{column, query_failed, uuid_column};

pub struct MySqlProfileRepository {
    pool: MySqlPool,
}

impl MySqlProfileRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_profile(row: &MySqlRow) -> Result<Profile, DomainError> {
        Ok(Profile {
            user_id: uuid_column(row, "user_id")?,
            first_name: column(row, "first_name")?,
            last_name: column(row, "last_name")?,
            display_name: column(row, "display_name")?,
            bio: column(row, "bio")?,
            avatar_url: column(row, "avatar_url")?,
            date_of_birth: column(row, "date_of_birth")?,
            gender: column(row, "gender")?,
            address: column(row, "address")?,
            city: column(row, "city")?,
            country: column(row, "country")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
        })
    }
}

#[async_trait]
impl ProfileRepository for MySqlProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, first_name, last_name, display_name, bio, avatar_url,
                   date_of_birth, gender, address, city, country, created_at, updated_at
            FROM profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("find profile"))?;

        row.as_ref().map(Self::row_to_profile).transpose()
    }

    async fn upsert(&self, profile: Profile) -> Result<Profile, DomainError> {
        // created_at is kept from the first insert
        sqlx::query(
            r#"
            INSERT INTO profiles (
                user_id, first_name, last_name, display_name, bio, avatar_url,
                date_of_birth, gender, address, city, country, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                first_name = VALUES(first_name),
                last_name = VALUES(last_name),
                display_name = VALUES(display_name),
                bio = VALUES(bio),
                avatar_url = VALUES(avatar_url),
                date_of_birth = VALUES(date_of_birth),
                gender = VALUES(gender),
                address = VALUES(address),
                city = VALUES(city),
                country = VALUES(country),
                updated_at = VALUES(updated_at)
            "#,
        )
        .bind(profile.user_id.to_string())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.display_name)
        .bind(&profile.bio)
        .bind(&profile.avatar_url)
        .bind(profile.date_of_birth)
        .bind(&profile.gender)
        .bind(&profile.address)
        .bind(&profile.city)
        .bind(&profile.country)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .execute(&self.pool)
        .await
        .map_err(query_failed("save profile"))?;

        Ok(profile)
    }
}
