//! Administrator routes
//!
//! Every handler here takes [`AdminContext`], so callers without the `admin`
//! role get `403 FORBIDDEN` before any service call.

use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use acct_shared::ApiResponse;

use crate::app::AppState;
use crate::dto::admin::{
    AssignRoleRequest, RoleResponse, SmsLogQuery, SmsLogResponse, UserRolesResponse,
};
use crate::dto::verification::{VerificationListQuery, VerificationResponse};
use crate::handlers::ApiError;
use crate::middleware::AdminContext;

/// Handler for GET /api/v1/roles
pub async fn list_roles(
    _admin: AdminContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let roles = state
        .role_service
        .list()
        .await?
        .into_iter()
        .map(RoleResponse::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(ApiResponse::success(roles)))
}

/// Handler for POST /api/v1/admin/users/{id}/roles
///
/// Assigning a role the user already holds is not an error.
pub async fn assign_role(
    admin: AdminContext,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    request: web::Json<AssignRoleRequest>,
) -> Result<HttpResponse, ApiError> {
    request.validate()?;
    let user_id = path.into_inner();

    let roles = state.role_service.assign(user_id, &request.role).await?;
    tracing::info!(
        admin_id = %admin.0.user_id,
        user_id = %user_id,
        role = %request.role,
        "Admin assigned role"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserRolesResponse { user_id, roles })))
}

/// Handler for DELETE /api/v1/admin/users/{id}/roles/{role}
pub async fn revoke_role(
    admin: AdminContext,
    state: web::Data<AppState>,
    path: web::Path<(Uuid, String)>,
) -> Result<HttpResponse, ApiError> {
    let (user_id, role) = path.into_inner();

    let roles = state.role_service.revoke(user_id, &role).await?;
    tracing::info!(
        admin_id = %admin.0.user_id,
        user_id = %user_id,
        role = %role,
        "Admin revoked role"
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(UserRolesResponse { user_id, roles })))
}

/// Handler for GET /api/v1/admin/verifications?status=
pub async fn list_verifications(
    _admin: AdminContext,
    state: web::Data<AppState>,
    query: web::Query<VerificationListQuery>,
) -> Result<HttpResponse, ApiError> {
    let requests = state
        .verification_service
        .list(query.status)
        .await?
        .into_iter()
        .map(VerificationResponse::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(ApiResponse::success(requests)))
}

/// Handler for GET /api/v1/admin/sms-logs?phone=&limit=
///
/// Newest first. Codes in stored messages are already masked.
pub async fn list_sms_logs(
    _admin: AdminContext,
    state: web::Data<AppState>,
    query: web::Query<SmsLogQuery>,
) -> Result<HttpResponse, ApiError> {
    let phone = match query.phone.as_deref().map(str::trim) {
        Some(phone) if !phone.is_empty() => Some(state.otp_service.normalize_phone(phone)?),
        _ => None,
    };

    let logs = state
        .sms_logs
        .recent(phone.as_deref(), query.effective_limit())
        .await?
        .into_iter()
        .map(SmsLogResponse::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(ApiResponse::success(logs)))
}
