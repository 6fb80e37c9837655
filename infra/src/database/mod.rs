//! Database module - MySQL implementations using SQLx

pub mod connection;
pub mod mysql;

use std::sync::Arc;

use acct_core::repositories::{
    OtpStore, ProfileRepository, RefreshTokenRepository, RoleRepository, SmsLogRepository,
    UserRepository, VerificationRequestRepository,
};

pub use connection::DatabasePool;
pub use mysql::{
    MySqlOtpStore, MySqlProfileRepository, MySqlRefreshTokenRepository, MySqlRoleRepository,
    MySqlSmsLogRepository, MySqlUserRepository, MySqlVerificationRequestRepository,
};

/// Every store backed by one shared pool
#[derive(Clone)]
pub struct MySqlStores {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
    pub otps: Arc<dyn OtpStore>,
    pub refresh_tokens: Arc<dyn RefreshTokenRepository>,
    pub verifications: Arc<dyn VerificationRequestRepository>,
    pub sms_logs: Arc<dyn SmsLogRepository>,
}

impl MySqlStores {
    pub fn new(database: &DatabasePool) -> Self {
        let pool = database.get_pool().clone();
        Self {
            users: Arc::new(MySqlUserRepository::new(pool.clone())),
            roles: Arc::new(MySqlRoleRepository::new(pool.clone())),
            profiles: Arc::new(MySqlProfileRepository::new(pool.clone())),
            otps: Arc::new(MySqlOtpStore::new(pool.clone())),
            refresh_tokens: Arc::new(MySqlRefreshTokenRepository::new(pool.clone())),
            verifications: Arc::new(MySqlVerificationRequestRepository::new(pool.clone())),
            sms_logs: Arc::new(MySqlSmsLogRepository::new(pool)),
        }
    }
}
