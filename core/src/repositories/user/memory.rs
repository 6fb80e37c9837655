//! In-memory user and role repositories

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::user::{Role, User, ROLE_ADMIN, ROLE_USER};
use crate::errors::{DomainError, ValidationError};

use super::trait_::{RoleRepository, UserRepository};

/// User repository enforcing the same unique fields as the database schema
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Name of the first unique field `candidate` shares with another user
fn conflicting_field(users: &HashMap<Uuid, User>, candidate: &User) -> Option<&'static str> {
    let same = |a: &Option<String>, b: &Option<String>| matches!((a, b), (Some(x), Some(y)) if x == y);
    users
        .values()
        .filter(|u| u.id != candidate.id)
        .find_map(|u| {
            if same(&u.username, &candidate.username) {
                Some("username")
            } else if same(&u.email, &candidate.email) {
                Some("email")
            } else if same(&u.phone, &candidate.phone) {
                Some("phone")
            } else {
                None
            }
        })
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        if let Some(field) = conflicting_field(&users, &user) {
            return Err(ValidationError::DuplicateValue {
                field: field.to_string(),
            }
            .into());
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username.as_deref() == Some(username))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let email = email.to_lowercase();
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.email.as_deref() == Some(email.as_str()))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.phone.as_deref() == Some(phone))
            .cloned())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(DomainError::not_found("user"));
        }
        if let Some(field) = conflicting_field(&users, user) {
            return Err(ValidationError::DuplicateValue {
                field: field.to_string(),
            }
            .into());
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

/// Role repository seeded with `user` and `admin`
#[derive(Clone)]
pub struct InMemoryRoleRepository {
    roles: Arc<RwLock<Vec<Role>>>,
    assignments: Arc<RwLock<HashMap<Uuid, BTreeSet<Uuid>>>>,
}

impl InMemoryRoleRepository {
    pub fn new() -> Self {
        let now = Utc::now();
        let roles = vec![
            Role::new(ROLE_USER, Some("Registered user".to_string()), now),
            Role::new(ROLE_ADMIN, Some("Administrator".to_string()), now),
        ];
        Self {
            roles: Arc::new(RwLock::new(roles)),
            assignments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Add a role definition
    pub async fn add_role(&self, role: Role) {
        self.roles.write().await.push(role);
    }
}

impl Default for InMemoryRoleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn list(&self) -> Result<Vec<Role>, DomainError> {
        let mut roles = self.roles.read().await.clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, DomainError> {
        let roles = self.roles.read().await;
        Ok(roles.iter().find(|r| r.name == name).cloned())
    }

    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>, DomainError> {
        let assignments = self.assignments.read().await;
        let roles = self.roles.read().await;
        let mut names: Vec<String> = assignments
            .get(&user_id)
            .map(|ids| {
                roles
                    .iter()
                    .filter(|r| ids.contains(&r.id))
                    .map(|r| r.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        Ok(names)
    }

    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, DomainError> {
        let mut assignments = self.assignments.write().await;
        Ok(assignments.entry(user_id).or_default().insert(role_id))
    }

    async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, DomainError> {
        let mut assignments = self.assignments.write().await;
        Ok(assignments
            .get_mut(&user_id)
            .map_or(false, |ids| ids.remove(&role_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unique_fields_report_the_conflicting_field() {
        let repo = InMemoryUserRepository::new();
        let now = Utc::now();
        repo.create(User::new(
            Some("abebe".into()),
            Some("abebe@example.com".into()),
            Some("+251911000000".into()),
            None,
            now,
        ))
        .await
        .unwrap();

        let err = repo
            .create(User::new(None, None, Some("+251911000000".into()), None, now))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::ValidationErr(ValidationError::DuplicateValue { ref field }) if field == "phone"
        ));

        let err = repo
            .create(User::new(None, Some("ABEBE@example.com".into()), None, None, now))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::ValidationErr(ValidationError::DuplicateValue { ref field }) if field == "email"
        ));
    }

    #[tokio::test]
    async fn test_delete_frees_the_identifiers() {
        let repo = InMemoryUserRepository::new();
        let user = repo
            .create(User::new(None, None, Some("+251911000000".into()), None, Utc::now()))
            .await
            .unwrap();

        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
        assert!(repo.find_by_phone("+251911000000").await.unwrap().is_none());
        repo.create(User::new(None, None, Some("+251911000000".into()), None, Utc::now()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_role_assignment_is_idempotent() {
        let roles = InMemoryRoleRepository::new();
        let user_id = Uuid::new_v4();
        let admin = roles.find_by_name(ROLE_ADMIN).await.unwrap().unwrap();
        let user = roles.find_by_name(ROLE_USER).await.unwrap().unwrap();

        assert!(roles.assign(user_id, user.id).await.unwrap());
        assert!(roles.assign(user_id, admin.id).await.unwrap());
        assert!(!roles.assign(user_id, admin.id).await.unwrap());
        assert_eq!(
            roles.roles_for_user(user_id).await.unwrap(),
            vec!["admin".to_string(), "user".to_string()]
        );

        assert!(roles.revoke(user_id, admin.id).await.unwrap());
        assert!(!roles.revoke(user_id, admin.id).await.unwrap());
        assert_eq!(roles.roles_for_user(user_id).await.unwrap(), vec!["user".to_string()]);
    }
}
