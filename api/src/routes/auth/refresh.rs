use actix_web::{web, HttpResponse};
use validator::Validate;

use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{RefreshTokenRequest, TokenPairResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/v1/auth/refresh-token
///
/// Rotates the refresh token: the presented one is retired and a new pair is
/// returned. A reused, revoked or expired token answers `401`; an access
/// token sent here answers `400 WRONG_TOKEN_TYPE`.
pub async fn refresh_token(
    state: web::Data<AppState>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let pair = state.auth_service.refresh(&request.refresh_token).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(TokenPairResponse::from(pair))))
}
