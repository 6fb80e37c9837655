//! Domain-specific error types for authentication, OTP, token and validation failures
//!
//! Messages here are developer-facing. The presentation layer turns each
//! variant into a stable error code and a user-facing message.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Account is inactive")]
    AccountInactive,

    #[error("User not found")]
    UserNotFound,

    #[error("Insufficient permissions")]
    InsufficientPermissions,
}

/// One-time password errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpError {
    #[error("OTP requested too soon, retry in {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: i64 },

    #[error("Too many failed attempts, locked for {retry_after_minutes} minutes")]
    Locked { retry_after_minutes: i64 },

    #[error("No active OTP for this phone number")]
    NotFound,

    #[error("OTP expired")]
    Expired,

    #[error("Invalid OTP, {remaining_attempts} attempts remaining")]
    InvalidCode { remaining_attempts: u32 },

    #[error("No previous OTP to resend")]
    NothingToResend,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token not yet valid")]
    TokenNotYetValid,

    #[error("Wrong token type: expected {expected}")]
    WrongTokenType { expected: String },

    #[error("Invalid or expired refresh token")]
    InvalidOrExpiredRefreshToken,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Invalid length: {field} (min: {min}, max: {max})")]
    InvalidLength { field: String, min: usize, max: usize },

    #[error("Invalid phone number: {phone}")]
    InvalidPhone { phone: String },

    #[error("Duplicate value: {field}")]
    DuplicateValue { field: String },

    #[error("A pending {verification_type} verification request already exists")]
    DuplicatePendingRequest { verification_type: String },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },
}
