//! Application state and factory
//!
//! This module wires stores, the SMS gateway and the services into
//! [`AppState`] and provides the factory for the Actix-web application.

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use acct_core::domain::clock::{Clock, SystemClock};
use acct_core::repositories::{
    InMemoryOtpStore, InMemoryProfileRepository, InMemoryRefreshTokenRepository,
    InMemoryRoleRepository, InMemorySmsLogRepository, InMemoryUserRepository,
    InMemoryVerificationRequestRepository, OtpStore, ProfileRepository, RefreshTokenRepository,
    RoleRepository, SmsLogRepository, UserRepository, VerificationRequestRepository,
};
use acct_core::services::{
    AuthService, AuthServiceConfig, DocumentVerificationService, MaintenanceService, OtpService,
    OtpServiceConfig, ProfileService, RoleService, SmsGateway, TokenService, TokenServiceConfig,
};
use acct_infra::{build_gateway, DatabasePool, InfrastructureError, MySqlStores};
use acct_shared::phone::PhoneNormalizer;
use acct_shared::AppConfig;

use crate::handlers::error::{json_error_handler, path_error_handler, query_error_handler};
use crate::handlers::ApiError;
use crate::middleware::create_cors;
use crate::routes;

/// Every store the services need, behind trait objects
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub otps: Arc<dyn OtpStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub verifications: Arc<dyn VerificationRequestRepository>,
    pub sms_logs: Arc<dyn SmsLogRepository>,
}

impl Stores {
    /// Process-local stores; the role catalogue is seeded with `user` and `admin`
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            roles: Arc::new(InMemoryRoleRepository::new()),
            profiles: Arc::new(InMemoryProfileRepository::new()),
            otps: Arc::new(InMemoryOtpStore::new()),
            refresh_tokens: Arc::new(InMemoryRefreshTokenRepository::new()),
            verifications: Arc::new(InMemoryVerificationRequestRepository::new()),
            sms_logs: Arc::new(InMemorySmsLogRepository::new()),
        }
    }
}

impl From<MySqlStores> for Stores {
    fn from(stores: MySqlStores) -> Self {
        Self {
            users: stores.users,
            roles: stores.roles,
            profiles: stores.profiles,
            otps: stores.otps,
            refresh_tokens: stores.refresh_tokens,
            verifications: stores.verifications,
            sms_logs: stores.sms_logs,
        }
    }
}

/// Application state that holds shared services
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub otp_service: Arc<OtpService>,
    pub token_service: Arc<TokenService>,
    pub profile_service: Arc<ProfileService>,
    pub role_service: Arc<RoleService>,
    pub verification_service: Arc<DocumentVerificationService>,
    pub maintenance_service: Arc<MaintenanceService>,
    pub sms_logs: Arc<dyn SmsLogRepository>,
    /// Present when the MySQL backend is in use
    pub database: Option<DatabasePool>,
}

impl AppState {
    /// Build every service from configuration and the given collaborators
    pub fn new(
        config: &AppConfig,
        stores: Stores,
        sms: Arc<dyn SmsGateway>,
        clock: Arc<dyn Clock>,
        database: Option<DatabasePool>,
    ) -> Self {
        let otp_service = Arc::new(OtpService::new(
            stores.otps.clone(),
            sms,
            clock.clone(),
            PhoneNormalizer::new(config.default_country_code.clone()),
            OtpServiceConfig::from_settings(&config.otp, config.environment),
        ));
        let token_service = Arc::new(TokenService::new(
            stores.refresh_tokens.clone(),
            clock.clone(),
            TokenServiceConfig::from_settings(&config.auth),
        ));
        let auth_service = Arc::new(AuthService::new(
            stores.users.clone(),
            stores.roles.clone(),
            stores.profiles.clone(),
            otp_service.clone(),
            token_service.clone(),
            clock.clone(),
            AuthServiceConfig::from_settings(&config.auth),
        ));
        let profile_service = Arc::new(ProfileService::new(
            stores.profiles.clone(),
            stores.users.clone(),
            clock.clone(),
        ));
        let role_service = Arc::new(RoleService::new(stores.roles.clone(), stores.users.clone()));
        let verification_service = Arc::new(DocumentVerificationService::new(
            stores.verifications.clone(),
            stores.users.clone(),
            clock,
        ));
        let maintenance_service = Arc::new(MaintenanceService::new(
            otp_service.clone(),
            token_service.clone(),
            config.maintenance.clone(),
        ));

        Self {
            auth_service,
            otp_service,
            token_service,
            profile_service,
            role_service,
            verification_service,
            maintenance_service,
            sms_logs: stores.sms_logs,
            database,
        }
    }

    /// State backed by in-memory stores, the configured SMS gateway and the wall clock
    pub fn in_memory(config: &AppConfig) -> Result<Self, InfrastructureError> {
        let stores = Stores::in_memory();
        let sms = build_gateway(&config.sms, stores.sms_logs.clone())?;
        Ok(Self::new(config, stores, sms, Arc::new(SystemClock), None))
    }

    /// Name of the storage backend reported by the health check
    pub fn storage_name(&self) -> &'static str {
        if self.database.is_some() {
            "mysql"
        } else {
            "memory"
        }
    }
}

/// Create and configure the application with all dependencies
pub fn create_app(
    state: web::Data<AppState>,
    config: &AppConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let token_service = web::Data::from(state.token_service.clone());

    App::new()
        .app_data(state)
        .app_data(token_service)
        .app_data(
            web::JsonConfig::default()
                .limit(config.server.max_payload_size)
                .error_handler(json_error_handler),
        )
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        // Middleware order: the last wrap runs first
        .wrap(create_cors(&config.cors))
        .wrap(TracingLogger::default())
        .configure(routes::configure)
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> Result<actix_web::HttpResponse, ApiError> {
    Err(ApiError::RouteNotFound)
}
