//! Error to HTTP response mapping
//!
//! Every failure leaves the API through [`ApiError`]. The status code comes
//! from [`status_for`], the only place an [`ErrorKind`] is turned into a
//! status. Bodies use the shared envelope with a stable error code and,
//! where useful, details such as `remainingAttempts` or `field`.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{http::StatusCode, HttpRequest, HttpResponse, ResponseError};
use thiserror::Error;
use validator::ValidationErrors;

use acct_core::errors::{AuthError, DomainError, ErrorKind, OtpError, TokenError, ValidationError};
use acct_shared::{error_codes, ApiResponse, ErrorBody};

/// Message returned in place of internal failure details
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error type returned by every handler and middleware
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Invalid request data")]
    InvalidRequest(#[from] ValidationErrors),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Route not found")]
    RouteNotFound,
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Domain(err.into())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        ApiError::Domain(err.into())
    }
}

/// Status code for each error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Duplicate => StatusCode::BAD_REQUEST,
        ErrorKind::AuthInvalid => StatusCode::UNAUTHORIZED,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::Locked => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Stable client-facing code for a domain error
pub fn error_code(error: &DomainError) -> &'static str {
    match error {
        DomainError::Validation { .. } => error_codes::VALIDATION_ERROR,
        DomainError::NotFound { .. } => error_codes::NOT_FOUND,
        DomainError::Forbidden { .. } => error_codes::FORBIDDEN,
        DomainError::Upstream { .. } => error_codes::UPSTREAM_UNAVAILABLE,
        DomainError::Internal { .. } => error_codes::INTERNAL_ERROR,
        DomainError::Auth(err) => match err {
            AuthError::InvalidCredentials => error_codes::INVALID_CREDENTIALS,
            AuthError::Unauthenticated => error_codes::UNAUTHORIZED,
            AuthError::AccountInactive => error_codes::ACCOUNT_INACTIVE,
            AuthError::UserNotFound => error_codes::USER_NOT_FOUND,
            AuthError::InsufficientPermissions => error_codes::FORBIDDEN,
        },
        DomainError::Otp(err) => match err {
            OtpError::RateLimited { .. } => error_codes::RATE_LIMITED,
            OtpError::Locked { .. } => error_codes::OTP_LOCKED,
            OtpError::NotFound | OtpError::NothingToResend => error_codes::OTP_NOT_FOUND,
            OtpError::Expired => error_codes::OTP_EXPIRED,
            OtpError::InvalidCode { .. } => error_codes::OTP_INVALID,
        },
        DomainError::Token(err) => match err {
            TokenError::TokenExpired => error_codes::TOKEN_EXPIRED,
            TokenError::WrongTokenType { .. } => error_codes::WRONG_TOKEN_TYPE,
            TokenError::InvalidOrExpiredRefreshToken => error_codes::INVALID_REFRESH_TOKEN,
            TokenError::TokenGenerationFailed => error_codes::INTERNAL_ERROR,
            TokenError::InvalidToken
            | TokenError::InvalidSignature
            | TokenError::TokenNotYetValid => error_codes::TOKEN_INVALID,
        },
        DomainError::ValidationErr(err) => match err {
            ValidationError::InvalidPhone { .. } => error_codes::PHONE_INVALID,
            ValidationError::DuplicateValue { .. }
            | ValidationError::DuplicatePendingRequest { .. } => error_codes::DUPLICATE_VALUE,
            _ => error_codes::VALIDATION_ERROR,
        },
    }
}

fn error_body(error: &DomainError) -> ErrorBody {
    let body = ErrorBody::new(error_code(error));
    match error {
        DomainError::Otp(OtpError::InvalidCode { remaining_attempts }) => {
            body.add_detail("remainingAttempts", remaining_attempts)
        }
        DomainError::Otp(OtpError::RateLimited {
            retry_after_seconds,
        }) => body.add_detail("retryAfterSeconds", retry_after_seconds),
        DomainError::Otp(OtpError::Locked {
            retry_after_minutes,
        }) => body
            .add_detail("retryAfterMinutes", retry_after_minutes)
            .add_detail("retryAfterSeconds", retry_after_minutes * 60),
        DomainError::ValidationErr(err) => match err {
            ValidationError::RequiredField { field }
            | ValidationError::InvalidFormat { field }
            | ValidationError::DuplicateValue { field } => body.add_detail("field", field),
            ValidationError::InvalidLength { field, min, max } => body
                .add_detail("field", field)
                .add_detail("min", min)
                .add_detail("max", max),
            ValidationError::InvalidPhone { .. } => body.add_detail("field", "phone"),
            ValidationError::DuplicatePendingRequest { verification_type } => {
                body.add_detail("verificationType", verification_type)
            }
            ValidationError::InvalidStatusTransition { from, to } => {
                body.add_detail("from", from).add_detail("to", to)
            }
        },
        _ => body,
    }
}

/// Names of the fields that failed validation, sorted
fn invalid_fields(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<String> = errors
        .field_errors()
        .into_iter()
        .map(|(field, _)| field.to_string())
        .collect();
    fields.sort();
    fields
}

impl ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Domain(err) => err.kind(),
            ApiError::InvalidRequest(_) | ApiError::MalformedRequest(_) => ErrorKind::Validation,
            ApiError::RouteNotFound => ErrorKind::NotFound,
        }
    }

    fn body(&self) -> (String, ErrorBody) {
        match self {
            ApiError::Domain(err) if err.kind() == ErrorKind::Internal => {
                (INTERNAL_MESSAGE.to_string(), error_body(err))
            }
            ApiError::Domain(err) => (err.to_string(), error_body(err)),
            ApiError::InvalidRequest(errors) => {
                let fields = invalid_fields(errors);
                let mut body = ErrorBody::new(error_codes::VALIDATION_ERROR);
                if let Some(first) = fields.first() {
                    body = body.add_detail("field", first);
                }
                (self.to_string(), body.add_detail("fields", fields))
            }
            ApiError::MalformedRequest(_) => {
                (self.to_string(), ErrorBody::new(error_codes::VALIDATION_ERROR))
            }
            ApiError::RouteNotFound => (self.to_string(), ErrorBody::new(error_codes::NOT_FOUND)),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let (message, body) = self.body();
        HttpResponse::build(status).json(ApiResponse::<()>::failure(message, body))
    }
}

/// Rejects bodies that are not valid JSON for the target type
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::MalformedRequest(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::MalformedRequest(err.to_string()).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::MalformedRequest(err.to_string()).into()
}
