//! Business services containing domain logic and use cases.

pub mod auth;
pub mod document;
pub mod hashing;
pub mod maintenance;
pub mod otp;
pub mod profile;
pub mod role;
pub mod token;

// Re-export commonly used types
pub use auth::{AccountOverview, AuthService, AuthServiceConfig, AuthSession, ClientInfo, RegisterInput};
pub use document::DocumentVerificationService;
pub use maintenance::{CleanupResult, MaintenanceService};
pub use otp::{OtpDispatch, OtpService, OtpServiceConfig, OtpVerified, SmsError, SmsGateway, SmsReceipt};
pub use profile::ProfileService;
pub use role::RoleService;
pub use token::{TokenService, TokenServiceConfig};
