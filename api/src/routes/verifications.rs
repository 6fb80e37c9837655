//! Document verification routes under `/api/v1/verifications`

use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::verification::{
    ReviewVerificationRequest, SubmitVerificationRequest, VerificationResponse,
};
use crate::handlers::ApiError;
use crate::middleware::{AdminContext, AuthContext};

/// Handler for POST /api/v1/verifications
///
/// `201 Created` with the pending request; `400 DUPLICATE_VALUE` when the
/// caller already has a pending request of the same type.
pub async fn submit(
    auth: AuthContext,
    state: web::Data<AppState>,
    request: web::Json<SubmitVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let created = state
        .verification_service
        .submit(
            auth.user_id,
            request.verification_type,
            &request.document_url,
            request.notes,
        )
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::success_with_message(
        VerificationResponse::from(created),
        "Verification request submitted",
    )))
}

/// Handler for GET /api/v1/verifications
pub async fn list_own(
    auth: AuthContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let requests = state
        .verification_service
        .list_for_user(auth.user_id)
        .await?
        .into_iter()
        .map(VerificationResponse::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Handler for PUT /api/v1/verifications/{id}
///
/// Admin only. Approves or rejects a pending request.
pub async fn review(
    admin: AdminContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    request: web::Json<ReviewVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = request.into_inner();
    request.validate()?;

    let reviewed = state
        .verification_service
        .review(
            path.into_inner(),
            admin.0.user_id,
            request.status,
            request.review_notes,
        )
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
        VerificationResponse::from(reviewed),
        "Verification request reviewed",
    )))
}
