//! MySQL implementation of the RoleRepository trait.
//!
//! The `user` and `admin` rows are seeded by the initial migration.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::mysql::MySqlRow;
use sqlx::MySqlPool;
use uuid::Uuid;

use acct_core::domain::entities::user::Role;
use acct_core::errors::DomainError;
use acct_core::repositories::RoleRepository;

use super::{column, query_failed, uuid_column};

pub struct MySqlRoleRepository {
    pool: MySqlPool,
}

impl MySqlRoleRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_role(row: &MySqlRow) -> Result<Role, DomainError> {
        Ok(Role {
            id: uuid_column(row, "id")?,
            name: column(row, "name")?,
            description: column(row, "description")?,
            created_at: column(row, "created_at")?,
        })
    }
}

#[async_trait]
impl RoleRepository for MySqlRoleRepository {
    async fn list(&self) -> Result<Vec<Role>, DomainError> {
        let rows = sqlx::query("SELECT id, name, description, created_at FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(query_failed("list roles"))?;

        rows.iter().map(Self::row_to_role).collect()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, DomainError> {
        let row = sqlx::query(
            "SELECT id, name, description, created_at FROM roles WHERE name = ? LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_failed("find role"))?;

        row.as_ref().map(Self::row_to_role).transpose()
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = ?
            ORDER BY r.name
            "#,
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(query_failed("load user roles"))?;

        rows.iter().map(|row| column(row, "name")).collect()
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "INSERT IGNORE INTO user_roles (user_id, role_id, assigned_at) VALUES (?, ?, ?)",
        )
        .bind(user_id.to_string())
        .bind(role_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(query_failed("assign role"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = ? AND role_id = ?")
            .bind(user_id.to_string())
            .bind(role_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(query_failed("revoke role"))?;

        Ok(result.rows_affected() > 0)
    }
}
