//! One-time code endpoints
//!
//! Issuance never fails because the SMS could not be delivered: the response
//! reports `sent: false` and the code stays valid.

use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use acct_shared::phone::mask_phone_number;
use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{AuthResponse, OtpDispatchResponse, OtpRequest, OtpVerifyRequest};
use crate::handlers::ApiError;
use crate::routes::{client_info, extract_client_ip};

/// Handler for POST /api/v1/auth/otp/request
///
/// # Response
///
/// `200 OK` with `{sent, expiresIn, providerInfo?, devCode?}`; `devCode` is
/// only present outside production when code exposure is enabled.
/// `400 PHONE_INVALID`, `429 RATE_LIMITED` during the resend cooldown and
/// `429 OTP_LOCKED` during a lockout.
pub async fn request_otp(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<OtpRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    tracing::info!(
        phone = %mask_phone_number(&request.phone),
        ip = %extract_client_ip(&req).unwrap_or_default(),
        "Processing OTP request"
    );

    let dispatch = state.auth_service.request_otp(&request.phone).await?;
    let message = if dispatch.sent {
        "Verification code sent"
    } else {
        "Verification code issued but SMS delivery failed"
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        OtpDispatchResponse::from(dispatch),
        message,
    )))
}

/// Handler for POST /api/v1/auth/otp/resend
///
/// Same as a request, but `404 OTP_NOT_FOUND` when no code was issued before.
pub async fn resend_otp(
    state: web::Data<AppState>,
    request: web::Json<OtpRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let dispatch = state.auth_service.resend_otp(&request.phone).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        OtpDispatchResponse::from(dispatch),
        "Verification code resent",
    )))
}

/// Handler for POST /api/v1/auth/otp/verify
///
/// # Response
///
/// `200 OK` with `{user, roles, accessToken, refreshToken, expiresIn}` and
/// the user marked verified. Wrong, expired or missing codes answer `400`
/// (`OTP_INVALID` carries `remainingAttempts`), a lockout answers `429` and
/// an unknown phone `404 USER_NOT_FOUND`.
pub async fn verify_otp(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<OtpVerifyRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let session = state
        .auth_service
        .verify_otp(&request.phone, &request.code, &client_info(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        AuthResponse::from(session),
        "Phone number verified",
    )))
}
