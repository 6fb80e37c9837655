//! Route table for `/api/v1`

pub mod admin;
pub mod auth;
pub mod health;
pub mod profiles;
pub mod verifications;

use actix_web::{http::header::USER_AGENT, web, HttpRequest};

use acct_core::services::ClientInfo;

use crate::middleware::JwtAuth;

/// Register every route on the application
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(health::health_check))
                .service(auth::scope())
                .service(
                    web::scope("/profiles")
                        .wrap(JwtAuth)
                        .route("/me", web::get().to(profiles::get_my_profile))
                        .route("", web::put().to(profiles::update_profile)),
                )
                .service(
                    web::scope("/verifications")
                        .wrap(JwtAuth)
                        .route("", web::post().to(verifications::submit))
                        .route("", web::get().to(verifications::list_own))
                        .route("/{id}", web::put().to(verifications::review)),
                )
                .service(
                    web::resource("/roles")
                        .wrap(JwtAuth)
                        .route(web::get().to(admin::list_roles)),
                )
                .service(
                    web::scope("/admin")
                        .wrap(JwtAuth)
                        .route("/verifications", web::get().to(admin::list_verifications))
                        .route("/users/{id}/roles", web::post().to(admin::assign_role))
                        .route(
                            "/users/{id}/roles/{role}",
                            web::delete().to(admin::revoke_role),
                        )
                        .route("/sms-logs", web::get().to(admin::list_sms_logs)),
                ),
        );
}

/// Extracts the client IP address, honouring proxy headers
pub(crate) fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    req.connection_info()
        .realip_remote_addr()
        .map(|addr| addr.to_string())
}

/// Extracts the user agent string
pub(crate) fn extract_user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

/// Client details recorded with issued refresh tokens
pub(crate) fn client_info(req: &HttpRequest) -> ClientInfo {
    ClientInfo {
        user_agent: extract_user_agent(req),
        ip: extract_client_ip(req),
    }
}
