use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use acct_shared::phone::mask_phone_number;
use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::auth::{AuthResponse, RegisterRequest};
use crate::handlers::ApiError;
use crate::routes::client_info;

/// Handler for POST /api/v1/auth/register
///
/// Creates the account with the `user` role and an empty profile, then signs
/// the user in.
///
/// # Request Body
///
/// ```json
/// {
///     "username": "abebe",
///     "email": "abebe@example.com",
///     "phone": "+251911000000",
///     "password": "Sup3rSecret!"
/// }
/// ```
///
/// At least one of `username`, `email` and `phone` is required.
///
/// # Response
///
/// `201 Created` with `{user, roles, accessToken, refreshToken, expiresIn}`.
/// `400` for a missing or short password or an identifier already in use.
pub async fn register(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    tracing::info!(
        phone = %request.phone.as_deref().map(mask_phone_number).unwrap_or_default(),
        has_email = request.email.is_some(),
        "Processing registration"
    );

    let session = state
        .auth_service
        .register(request.into(), &client_info(&req))
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        AuthResponse::from(session),
        "Registration successful",
    )))
}
