//! User and role repository traits.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::user::{Role, User};
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// `username`, `email` and `phone` are unique when present. Implementations
/// report a violated constraint as `ValidationError::DuplicateValue` naming
/// the field, so callers get a field-specific message even when a concurrent
/// registration slips past the service-level lookups.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> Result<User, DomainError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Lookup by lowercase email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Lookup by canonical phone
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, DomainError>;

    /// Persist changed fields of an existing user
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// Remove a user together with its profile and role assignments
    ///
    /// Returns `true` if a row was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}

/// Roles and user-role assignments
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Role>, DomainError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, DomainError>;

    /// Role names held by a user, sorted
    async fn roles_for_user(&self, user_id: Uuid) -> Result<Vec<String>, DomainError>;

    /// `true` if the assignment is new
    async fn assign(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, DomainError>;

    /// `true` if an assignment was removed
    async fn revoke(&self, user_id: Uuid, role_id: Uuid) -> Result<bool, DomainError>;
}
