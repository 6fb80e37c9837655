//! Configuration for the authentication service

use acct_shared::config::AuthConfig;

/// Longest password accepted at registration
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Configuration for the authentication service
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    /// Minimum accepted password length
    pub password_min_length: usize,
    /// bcrypt cost for password hashes
    pub bcrypt_cost: u32,
    /// Lowercased emails or canonical phones that receive the admin role on registration
    pub bootstrap_admins: Vec<String>,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self::from_settings(&AuthConfig::default())
    }
}

impl AuthServiceConfig {
    pub fn from_settings(settings: &AuthConfig) -> Self {
        Self {
            password_min_length: settings.password_min_length,
            bcrypt_cost: settings.bcrypt_cost,
            bootstrap_admins: settings.bootstrap_admins.clone(),
        }
    }

    /// Whether a new account with these identifiers starts as an admin
    pub fn is_bootstrap_admin(&self, email: Option<&str>, phone: Option<&str>) -> bool {
        self.bootstrap_admins.iter().any(|entry| {
            email.map_or(false, |e| e.eq_ignore_ascii_case(entry)) || phone == Some(entry.as_str())
        })
    }
}
