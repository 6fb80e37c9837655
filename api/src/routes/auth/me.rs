use actix_web::{web, HttpResponse};

use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::MeResponse;
use crate::handlers::ApiError;
use crate::middleware::AuthContext;

/// Handler for GET /api/v1/auth/me
pub async fn me(auth: AuthContext, state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let overview = state.auth_service.me(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(MeResponse::from(overview))))
}
