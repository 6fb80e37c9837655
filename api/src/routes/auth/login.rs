use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{AuthResponse, LoginRequest};
use crate::handlers::ApiError;
use crate::routes::client_info;

/// Handler for POST /api/v1/auth/login
///
/// Unknown emails and wrong passwords both answer `401 INVALID_CREDENTIALS`;
/// inactive accounts answer `403 ACCOUNT_INACTIVE`.
pub async fn login(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;

    let session = state
        .auth_service
        .login(&request.email, &request.password, &client_info(&req))
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        AuthResponse::from(session),
        "Login successful",
    )))
}
