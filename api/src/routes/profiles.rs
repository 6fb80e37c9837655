//! Profile routes under `/api/v1/profiles`

use actix_web::{web, HttpResponse};
use validator::Validate;

use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::profile::{ProfileResponse, UpdateProfileRequest};
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/profiles/me
///
/// Users without a stored profile get an empty one.
pub async fn get_my_profile(
    auth: AuthContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let profile = state.profile_service.get(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(ProfileResponse::from(profile))))
}

/// Handler for PUT /api/v1/profiles
///
/// Partial update: only the fields present in the body change.
pub async fn update_profile(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let profile = state
        .profile_service
        .update(auth.user_id, request.into())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        ProfileResponse::from(profile),
        "Profile updated",
    )))
}
