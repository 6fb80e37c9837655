use actix_web::{web, HttpResponse};
use chrono::Utc;

use acct_shared::{error_codes, ApiResponse, ErrorBody, HealthResponse};

use crate::app::AppState;

/// Health check endpoint handler
///
/// With the MySQL backend the pool is pinged; a failed ping answers `503`.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage_ok = match &state.database {
        Some(database) => match database.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::error!(error = %e, "Database health check failed");
                false
            }
        },
        None => true,
    };

    let health = HealthResponse {
        status: if storage_ok { "healthy" } else { "unhealthy" }.to_string(),
        storage: state.storage_name().to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    if storage_ok {
        HttpResponse::Ok().json(ApiResponse::success(health))
    } else {
        HttpResponse::ServiceUnavailable().json(ApiResponse {
            success: false,
            message: Some("Storage is unavailable".to_string()),
            data: Some(health),
            error: Some(ErrorBody::new(error_codes::UPSTREAM_UNAVAILABLE)),
        })
    }
}
