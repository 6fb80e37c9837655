//! MySQL implementation of the UserRepository trait.
//!
//! Username, email and phone each carry a unique index; a violation is
//! reported as `ValidationError::DuplicateValue` naming the field.

use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use acct_core::domain::entities::user::User;
use acct_core::errors::{DomainError, ValidationError};
use acct_core::repositories::UserRepository;

use super::{column, query_failed, uuid_column, violated_unique_key};

const SELECT_COLUMNS: &str = r#"
    SELECT id, username, email, phone, password_hash, is_active, is_verified,
           created_at, updated_at, last_login_at
    FROM users
"#;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        Ok(User {
            id: uuid_column(row, "id")?,
            username: column(row, "username")?,
            email: column(row, "email")?,
            phone: column(row, "phone")?,
            password_hash: column(row, "password_hash")?,
            is_active: column(row, "is_active")?,
            is_verified: column(row, "is_verified")?,
            created_at: column(row, "created_at")?,
            updated_at: column(row, "updated_at")?,
            last_login_at: column(row, "last_login_at")?,
        })
    }

    async fn find_one(&self, filter: &str, value: &str) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE {} = ? LIMIT 1", SELECT_COLUMNS, filter);
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_failed("find user"))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }
}

/// Map a unique index name to the user field it protects
fn duplicate_field(key: &str) -> &'static str {
    match key {
        "uq_users_username" => "username",
        "uq_users_email" => "email",
        "uq_users_phone" => "phone",
        _ => "user",
    }
}

fn write_error(operation: &'static str) -> impl Fn(sqlx::Error) -> DomainError {
    move |e| match violated_unique_key(&e) {
        Some(key) => ValidationError::DuplicateValue {
            field: duplicate_field(&key).to_string(),
        }
        .into(),
        None => query_failed(operation)(e),
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (
                id, username, email, phone, password_hash, is_active, is_verified,
                created_at, updated_at, last_login_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(user.id.to_string())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.is_verified)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(user.last_login_at)
            .execute(&self.pool)
            .await
            .map_err(write_error("create user"))?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.find_one("id", &id.to_string()).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("email", &email.to_lowercase()).await
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError> {
        self.find_one("phone", phone).await
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let query = r#"
            UPDATE users
            SET username = ?, email = ?, phone = ?, password_hash = ?, is_active = ?,
                is_verified = ?, updated_at = ?, last_login_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.phone)
            .bind(&user.password_hash)
            .bind(user.is_active)
            .bind(user.is_verified)
            .bind(user.updated_at)
            .bind(user.last_login_at)
            .bind(user.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(write_error("update user"))?;

        // Zero affected rows also means "nothing changed" without CLIENT_FOUND_ROWS
        if result.rows_affected() == 0 && self.find_by_id(user.id).await?.is_none() {
            return Err(DomainError::not_found("user"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        // profiles, user_roles, refresh_tokens and verification_requests cascade
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failed("delete user"))?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_names() {
        assert_eq!(duplicate_field("uq_users_email"), "email");
        assert_eq!(duplicate_field("uq_users_phone"), "phone");
        assert_eq!(duplicate_field("uq_users_username"), "username");
        assert_eq!(duplicate_field("PRIMARY"), "user");
    }
}
