//! Shared utilities and common types for the account service
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types
//! - Error codes and the response envelope
//! - Utility functions (phone normalization, validation)

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, MaintenanceConfig, OtpConfig, ServerConfig, SmsConfig, SmsProvider,
    StorageBackend,
};
pub use errors::{error_codes, ErrorBody};
pub use types::{ApiResponse, HealthResponse};
pub use utils::{phone, validation};
