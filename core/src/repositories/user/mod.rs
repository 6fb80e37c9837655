#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::{InMemoryRoleRepository, InMemoryUserRepository};
pub use trait_::{RoleRepository, UserRepository};
