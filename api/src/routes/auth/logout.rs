use actix_web::{web, HttpResponse};
use validator::Validate;

use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{LogoutAllResponse, LogoutRequest, LogoutResponse};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

/// Handler for POST /api/v1/auth/logout
///
/// Revokes the given refresh token if it belongs to the caller. The access
/// token stays valid until it expires.
pub async fn logout(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<LogoutRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let revoked = state
        .auth_service
        .logout(auth.user_id, &request.refresh_token)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        LogoutResponse { revoked },
        "Logged out successfully",
    )))
}

/// Handler for POST /api/v1/auth/logout-all
pub async fn logout_all(
    auth: AuthContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let revoked = state.auth_service.logout_all(auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, revoked, event = "logout_all", "All sessions revoked");

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        LogoutAllResponse { revoked },
        "Logged out from all sessions",
    )))
}
