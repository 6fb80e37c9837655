//! Inputs and results of the authentication flows

use serde::{Deserialize, Serialize};

use crate::domain::entities::profile::Profile;
use crate::domain::entities::user::User;

/// Registration input; at least one identifier is required
#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Client details stored with refresh tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

impl ClientInfo {
    pub fn to_metadata(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A signed-in user with fresh tokens
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub roles: Vec<String>,
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// What `/auth/me` returns
#[derive(Debug, Clone)]
pub struct AccountOverview {
    pub user: User,
    pub profile: Option<Profile>,
    pub roles: Vec<String>,
}
