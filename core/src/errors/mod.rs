//! Domain-specific error types and error handling.
//!
//! Every error carries an [`ErrorKind`]; the HTTP layer maps kinds to status
//! codes in one table instead of inspecting messages.

mod types;

pub use types::{AuthError, OtpError, TokenError, ValidationError};

use acct_shared::phone::PhoneError;
use thiserror::Error;

/// Coarse error classification used for status mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input
    Validation,
    /// Unique-field conflict
    Duplicate,
    /// Bad credentials or token
    AuthInvalid,
    /// Role or ownership check failed
    Forbidden,
    /// Resource missing
    NotFound,
    /// Cooldown in effect
    RateLimited,
    /// Lockout in effect
    Locked,
    /// External dependency failed
    UpstreamUnavailable,
    /// Unexpected failure
    Internal,
}

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Upstream service unavailable: {service}")]
    Upstream { service: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Otp(#[from] OtpError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    ValidationErr(#[from] ValidationError),
}

impl DomainError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation { .. } => ErrorKind::Validation,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Forbidden { .. } => ErrorKind::Forbidden,
            DomainError::Upstream { .. } => ErrorKind::UpstreamUnavailable,
            DomainError::Internal { .. } => ErrorKind::Internal,
            DomainError::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::Unauthenticated => ErrorKind::AuthInvalid,
                AuthError::AccountInactive | AuthError::InsufficientPermissions => {
                    ErrorKind::Forbidden
                }
                AuthError::UserNotFound => ErrorKind::NotFound,
            },
            DomainError::Otp(err) => match err {
                OtpError::RateLimited { .. } => ErrorKind::RateLimited,
                OtpError::Locked { .. } => ErrorKind::Locked,
                OtpError::NotFound | OtpError::Expired | OtpError::InvalidCode { .. } => {
                    ErrorKind::Validation
                }
                OtpError::NothingToResend => ErrorKind::NotFound,
            },
            DomainError::Token(err) => match err {
                TokenError::WrongTokenType { .. } => ErrorKind::Validation,
                TokenError::TokenGenerationFailed => ErrorKind::Internal,
                _ => ErrorKind::AuthInvalid,
            },
            DomainError::ValidationErr(err) => match err {
                ValidationError::DuplicateValue { .. }
                | ValidationError::DuplicatePendingRequest { .. } => ErrorKind::Duplicate,
                _ => ErrorKind::Validation,
            },
        }
    }

    /// Shorthand for an internal error wrapping any displayable cause
    pub fn internal(message: impl std::fmt::Display) -> Self {
        DomainError::Internal {
            message: message.to_string(),
        }
    }

    /// Shorthand for a missing resource
    pub fn not_found(resource: impl Into<String>) -> Self {
        DomainError::NotFound {
            resource: resource.into(),
        }
    }
}

impl From<PhoneError> for DomainError {
    fn from(err: PhoneError) -> Self {
        let phone = match err {
            PhoneError::Empty => String::new(),
            PhoneError::InvalidFormat { input } => input,
        };
        DomainError::ValidationErr(ValidationError::InvalidPhone { phone })
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
