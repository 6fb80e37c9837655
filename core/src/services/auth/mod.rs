//! Authentication service module
//!
//! This module ties the account flows together:
//! - Registration and password login
//! - Phone login through one-time codes
//! - Refresh token rotation, logout and logout-all
//! - The signed-in user's account overview

mod config;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use config::AuthServiceConfig;
pub use service::AuthService;
pub use types::{AccountOverview, AuthSession, ClientInfo, RegisterInput};
