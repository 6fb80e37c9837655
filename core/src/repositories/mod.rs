//! Repository interfaces and their in-memory implementations.
//!
//! Each trait has a MySQL implementation in the infrastructure crate; the
//! in-memory versions back tests and the `memory` storage backend.

pub mod otp;
pub mod profile;
pub mod sms_log;
pub mod token;
pub mod user;
pub mod verification;

pub use otp::{InMemoryOtpStore, OtpStore};
pub use profile::{InMemoryProfileRepository, ProfileRepository};
pub use sms_log::{InMemorySmsLogRepository, SmsLogRepository};
pub use token::{InMemoryRefreshTokenRepository, RefreshTokenRepository};
pub use user::{InMemoryRoleRepository, InMemoryUserRepository, RoleRepository, UserRepository};
pub use verification::{InMemoryVerificationRequestRepository, VerificationRequestRepository};
