//! One-time password engine
//!
//! This module provides the complete OTP workflow:
//! - Code generation from the OS CSPRNG with fixed-width zero padding
//! - Digest-only storage with one pending record per key
//! - Resend cooldown and attempt-based lockout
//! - SMS delivery bounded by a timeout that never fails issuance

mod config;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::OtpServiceConfig;
pub use service::{render_message, OtpService};
pub use traits::{SmsError, SmsGateway, SmsReceipt};
pub use types::{OtpDispatch, OtpVerified};
