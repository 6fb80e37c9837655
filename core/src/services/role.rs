//! Role catalogue and per-user role assignment

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::user::Role;
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{RoleRepository, UserRepository};

pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    users: Arc<dyn UserRepository>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { roles, users }
    }

    pub async fn list(&self) -> DomainResult<Vec<Role>> {
        self.roles.list().await
    }

    /// Role names held by a user
    pub async fn roles_for(&self, user_id: Uuid) -> DomainResult<Vec<String>> {
        self.ensure_user(user_id).await?;
        self.roles.roles_for_user(user_id).await
    }

    /// Grant a role; returns the user's roles afterwards
    pub async fn assign(&self, user_id: Uuid, role_name: &str) -> DomainResult<Vec<String>> {
        let role = self.resolve(user_id, role_name).await?;
        if self.roles.assign(user_id, role.id).await? {
            tracing::info!(user_id = %user_id, role = %role.name, event = "role_assigned", "Role assigned");
        }
        self.roles.roles_for_user(user_id).await
    }

    /// Withdraw a role; returns the user's roles afterwards
    pub async fn revoke(&self, user_id: Uuid, role_name: &str) -> DomainResult<Vec<String>> {
        let role = self.resolve(user_id, role_name).await?;
        if self.roles.revoke(user_id, role.id).await? {
            tracing::info!(user_id = %user_id, role = %role.name, event = "role_revoked", "Role revoked");
        }
        self.roles.roles_for_user(user_id).await
    }

    async fn resolve(&self, user_id: Uuid, role_name: &str) -> DomainResult<Role> {
        self.ensure_user(user_id).await?;
        let name = role_name.trim().to_lowercase();
        self.roles
            .find_by_name(&name)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("role '{}'", name)))
    }

    async fn ensure_user(&self, user_id: Uuid) -> DomainResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(AuthError::UserNotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::entities::user::User;
    use crate::repositories::{InMemoryRoleRepository, InMemoryUserRepository};

    async fn setup() -> (RoleService, Uuid) {
        let users = InMemoryUserRepository::new();
        let user = users
            .create(User::new(Some("abebe".into()), None, None, None, Utc::now()))
            .await
            .unwrap();
        let service = RoleService::new(Arc::new(InMemoryRoleRepository::new()), Arc::new(users));
        (service, user.id)
    }

    #[tokio::test]
    async fn test_assign_and_revoke() {
        let (service, user_id) = setup().await;

        let roles = service.assign(user_id, "Admin").await.unwrap();
        assert_eq!(roles, vec!["admin".to_string()]);

        // Assigning twice is harmless
        let roles = service.assign(user_id, "admin").await.unwrap();
        assert_eq!(roles, vec!["admin".to_string()]);

        let roles = service.revoke(user_id, "admin").await.unwrap();
        assert!(roles.is_empty());
        assert!(service.roles_for(user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_role_or_user_is_not_found() {
        let (service, user_id) = setup().await;

        assert!(matches!(
            service.assign(user_id, "auditor").await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.assign(Uuid::new_v4(), "admin").await,
            Err(DomainError::Auth(AuthError::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn test_list_contains_seeded_roles() {
        let (service, _) = setup().await;
        let names: Vec<String> = service
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert!(names.contains(&"user".to_string()));
        assert!(names.contains(&"admin".to_string()));
    }
}
