use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use acct_core::domain::entities::token::TokenPair;
use acct_core::domain::entities::user::User;
use acct_core::services::{AccountOverview, AuthSession, OtpDispatch, RegisterInput};

use super::profile::ProfileResponse;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50))]
    pub username: Option<String>,
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[validate(length(min = 7, max = 20))]
    pub phone: Option<String>,
    pub password: Option<String>,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(request: RegisterRequest) -> Self {
        RegisterInput {
            username: request.username,
            email: request.email,
            phone: request.phone,
            password: request.password,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyRequest {
    #[validate(length(min = 7, max = 20))]
    pub phone: String,
    /// Sent as `otp`; `code` is still read
    #[serde(rename = "otp", alias = "code")]
    #[validate(length(min = 4, max = 10))]
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone: user.phone,
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub roles: Vec<String>,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            user: session.user.into(),
            roles: session.roles,
            access_token: session.access_token,
            refresh_token: session.refresh_token,
            expires_in: session.expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpDispatchResponse {
    pub sent: bool,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_code: Option<String>,
}

impl From<OtpDispatch> for OtpDispatchResponse {
    fn from(dispatch: OtpDispatch) -> Self {
        Self {
            sent: dispatch.sent,
            expires_in: dispatch.expires_in,
            provider_info: dispatch.provider_info,
            dev_code: dispatch.dev_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_in: pair.expires_in,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub revoked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutAllResponse {
    pub revoked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserResponse,
    pub profile: Option<ProfileResponse>,
    pub roles: Vec<String>,
}

impl From<AccountOverview> for MeResponse {
    fn from(overview: AccountOverview) -> Self {
        Self {
            user: overview.user.into(),
            profile: overview.profile.map(Into::into),
            roles: overview.roles,
        }
    }
}
