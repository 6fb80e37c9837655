//! Main authentication service implementation

use acct_shared::phone::mask_phone_number;
use acct_shared::validation::{is_valid_email, is_valid_username, non_blank};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::clock::Clock;
use crate::domain::entities::profile::Profile;
use crate::domain::entities::token::{AccessTokenSubject, TokenPair};
use crate::domain::entities::user::{User, ROLE_ADMIN, ROLE_USER};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
use crate::repositories::{ProfileRepository, RoleRepository, UserRepository};
use crate::services::hashing::{hash_secret, verify_secret};
use crate::services::otp::{OtpDispatch, OtpService};
use crate::services::token::TokenService;

use super::config::{AuthServiceConfig, PASSWORD_MAX_LENGTH};
use super::types::{AccountOverview, AuthSession, ClientInfo, RegisterInput};

/// Authentication service for the complete account flow
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
    profiles: Arc<dyn ProfileRepository>,
    otp_service: Arc<OtpService>,
    token_service: Arc<TokenService>,
    clock: Arc<dyn Clock>,
    config: AuthServiceConfig,
}

impl AuthService {
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `users` - User persistence
    /// * `roles` - Role catalogue and assignments
    /// * `profiles` - Profile persistence
    /// * `otp_service` - One-time code engine
    /// * `token_service` - Access and refresh token issuance
    /// * `clock` - Time source
    /// * `config` - Service configuration
    pub fn new(
        users: Arc<dyn UserRepository>,
        roles: Arc<dyn RoleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        otp_service: Arc<OtpService>,
        token_service: Arc<TokenService>,
        clock: Arc<dyn Clock>,
        config: AuthServiceConfig,
    ) -> Self {
        Self {
            users,
            roles,
            profiles,
            otp_service,
            token_service,
            clock,
            config,
        }
    }

    /// Register a new account
    ///
    /// This method:
    /// 1. Validates the password and the identifiers
    /// 2. Normalizes the phone number
    /// 3. Rejects identifiers already in use
    /// 4. Stores the user with the `user` role and an empty profile,
    ///    removing the user again if the role or profile write fails
    /// 5. Signs the user in
    pub async fn register(
        &self,
        input: RegisterInput,
        client: &ClientInfo,
    ) -> DomainResult<AuthSession> {
        let password = self.validate_password(input.password.as_deref())?;

        let username = non_blank(input.username);
        let email = non_blank(input.email).map(|e| e.to_lowercase());
        let phone = match non_blank(input.phone) {
            Some(raw) => Some(self.otp_service.normalize_phone(&raw)?),
            None => None,
        };

        if username.is_none() && email.is_none() && phone.is_none() {
            return Err(DomainError::Validation {
                message: "At least one of username, email or phone is required".to_string(),
            });
        }
        if let Some(username) = &username {
            if !is_valid_username(username) {
                return Err(ValidationError::InvalidFormat {
                    field: "username".to_string(),
                }
                .into());
            }
        }
        if let Some(email) = &email {
            if !is_valid_email(email) {
                return Err(ValidationError::InvalidFormat {
                    field: "email".to_string(),
                }
                .into());
            }
        }

        self.ensure_unique(username.as_deref(), email.as_deref(), phone.as_deref())
            .await?;

        let now = self.clock.now();
        let password_hash = hash_secret(password, self.config.bcrypt_cost)?;
        let user = self
            .users
            .create(User::new(username, email, phone, Some(password_hash), now))
            .await?;

        if let Err(e) = self.provision(&user).await {
            match self.users.delete(user.id).await {
                Ok(_) => tracing::warn!(
                    user_id = %user.id,
                    error = %e,
                    event = "registration_rolled_back",
                    "Removed user after failed provisioning"
                ),
                Err(cleanup) => tracing::error!(
                    user_id = %user.id,
                    error = %e,
                    cleanup_error = %cleanup,
                    event = "registration_rollback_failed",
                    "Could not remove partially registered user"
                ),
            }
            return Err(e);
        }

        tracing::info!(user_id = %user.id, event = "user_registered", "Registered new user");
        self.open_session(user, client).await
    }

    /// Sign in with email and password
    ///
    /// Unknown emails and wrong passwords produce the same error.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> DomainResult<AuthSession> {
        let email = email.trim().to_lowercase();
        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::warn!(event = "login_failed", reason = "unknown_email", "Login failed");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        let password_ok = user
            .password_hash
            .as_deref()
            .map_or(false, |hash| verify_secret(password, hash));
        if !password_ok {
            tracing::warn!(user_id = %user.id, event = "login_failed", reason = "bad_password", "Login failed");
            return Err(AuthError::InvalidCredentials.into());
        }
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        let mut user = user;
        user.record_login(self.clock.now());
        self.users.update(&user).await?;

        tracing::info!(user_id = %user.id, event = "login_success", "User logged in");
        self.open_session(user, client).await
    }

    /// Send a login code to a phone number
    pub async fn request_otp(&self, phone: &str) -> DomainResult<OtpDispatch> {
        self.otp_service.generate_and_send_otp(phone, None, None).await
    }

    /// Send a fresh login code to a phone that already requested one
    pub async fn resend_otp(&self, phone: &str) -> DomainResult<OtpDispatch> {
        self.otp_service.resend_otp(phone, None).await
    }

    /// Sign in with a one-time code
    ///
    /// The account must exist and be active before the code is checked, so a
    /// code is never spent on a phone without an account.
    pub async fn verify_otp(
        &self,
        phone: &str,
        code: &str,
        client: &ClientInfo,
    ) -> DomainResult<AuthSession> {
        let phone = self.otp_service.normalize_phone(phone)?;
        let mut user = self
            .users
            .find_by_phone(&phone)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        let verified = self.otp_service.verify_otp(&phone, code, None).await?;

        user.mark_verified(verified.verified_at);
        user.record_login(verified.verified_at);
        self.users.update(&user).await?;

        tracing::info!(
            user_id = %user.id,
            phone = %mask_phone_number(&phone),
            event = "otp_login_success",
            "User signed in with OTP"
        );
        self.open_session(user, client).await
    }

    /// Rotate a refresh token and sign a new access token
    pub async fn refresh(&self, raw_refresh_token: &str) -> DomainResult<TokenPair> {
        let (user_id, _) = TokenService::parse_refresh_token(raw_refresh_token)?;

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(TokenError::InvalidOrExpiredRefreshToken)?;
        if !user.is_active {
            return Err(AuthError::AccountInactive.into());
        }

        let rotated = self
            .token_service
            .rotate_refresh_token(raw_refresh_token, user_id)
            .await?
            .ok_or(TokenError::InvalidOrExpiredRefreshToken)?;

        let subject = self.subject_for(&user).await?;
        let access_token = self.token_service.sign_access_token(&subject)?;

        Ok(TokenPair {
            access_token,
            refresh_token: rotated.raw_token,
            expires_in: self.token_service.access_token_ttl_seconds(),
        })
    }

    /// Revoke one refresh token of the signed-in user
    pub async fn logout(&self, user_id: Uuid, raw_refresh_token: &str) -> DomainResult<bool> {
        let revoked = self
            .token_service
            .revoke_refresh_token(raw_refresh_token, user_id)
            .await?;
        tracing::info!(user_id = %user_id, revoked, event = "logout", "User logged out");
        Ok(revoked)
    }

    /// Revoke every refresh token of the signed-in user
    pub async fn logout_all(&self, user_id: Uuid) -> DomainResult<usize> {
        self.token_service.revoke_all_refresh_tokens(user_id).await
    }

    /// User, profile and roles of the signed-in user
    pub async fn me(&self, user_id: Uuid) -> DomainResult<AccountOverview> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        let profile = self.profiles.find_by_user(user_id).await?;
        let roles = self.roles.roles_for_user(user_id).await?;
        Ok(AccountOverview {
            user,
            profile,
            roles,
        })
    }

    fn validate_password<'a>(&self, password: Option<&'a str>) -> DomainResult<&'a str> {
        let password = password.filter(|p| !p.is_empty()).ok_or_else(|| {
            ValidationError::RequiredField {
                field: "password".to_string(),
            }
        })?;
        let length = password.chars().count();
        if length < self.config.password_min_length || length > PASSWORD_MAX_LENGTH {
            return Err(ValidationError::InvalidLength {
                field: "password".to_string(),
                min: self.config.password_min_length,
                max: PASSWORD_MAX_LENGTH,
            }
            .into());
        }
        Ok(password)
    }

    async fn ensure_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> DomainResult<()> {
        let duplicate = |field: &str| -> DomainError {
            ValidationError::DuplicateValue {
                field: field.to_string(),
            }
            .into()
        };

        if let Some(username) = username {
            if self.users.find_by_username(username).await?.is_some() {
                return Err(duplicate("username"));
            }
        }
        if let Some(email) = email {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(duplicate("email"));
            }
        }
        if let Some(phone) = phone {
            if self.users.find_by_phone(phone).await?.is_some() {
                return Err(duplicate("phone"));
            }
        }
        Ok(())
    }

    /// Default role, bootstrap admin role and empty profile for a new user
    async fn provision(&self, user: &User) -> DomainResult<()> {
        self.grant_role(user.id, ROLE_USER).await?;
        if self
            .config
            .is_bootstrap_admin(user.email.as_deref(), user.phone.as_deref())
        {
            self.grant_role(user.id, ROLE_ADMIN).await?;
            tracing::warn!(user_id = %user.id, event = "admin_bootstrapped", "Granted admin role at registration");
        }
        self.profiles
            .upsert(Profile::empty(user.id, user.created_at))
            .await?;
        Ok(())
    }

    async fn grant_role(&self, user_id: Uuid, role_name: &str) -> DomainResult<()> {
        let role = self
            .roles
            .find_by_name(role_name)
            .await?
            .ok_or_else(|| DomainError::internal(format!("role '{}' is not seeded", role_name)))?;
        self.roles.assign(user_id, role.id).await?;
        Ok(())
    }

    async fn subject_for(&self, user: &User) -> DomainResult<AccessTokenSubject> {
        let roles = self.roles.roles_for_user(user.id).await?;
        let profile = self
            .profiles
            .find_by_user(user.id)
            .await?
            .map(|p| p.snapshot());
        Ok(AccessTokenSubject {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            roles,
            profile,
            is_verified: user.is_verified,
        })
    }

    async fn open_session(&self, user: User, client: &ClientInfo) -> DomainResult<AuthSession> {
        let subject = self.subject_for(&user).await?;
        let access_token = self.token_service.sign_access_token(&subject)?;
        let refresh = self
            .token_service
            .issue_refresh_token(user.id, client.to_metadata())
            .await?;

        Ok(AuthSession {
            roles: subject.roles,
            user,
            access_token,
            refresh_token: refresh.raw_token,
            expires_in: self.token_service.access_token_ttl_seconds(),
        })
    }
}
