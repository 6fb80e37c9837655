//! CORS middleware configuration for cross-origin requests.
//!
//! Origins come from [`CorsConfig`]: development allows any origin, other
//! environments only the origins listed in `CORS_ALLOWED_ORIGINS`.

use actix_cors::Cors;
use actix_web::http::{header, Method};

use acct_shared::CorsConfig;

/// Creates a CORS middleware instance from configuration.
pub fn create_cors(config: &CorsConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-request-id"),
        ])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(config.max_age);

    if config.allows_any_origin() {
        cors = cors.allow_any_origin();
    } else {
        for origin in config.allowed_origins.iter().filter(|o| !o.is_empty()) {
            tracing::info!(origin = %origin, "Adding allowed origin");
            cors = cors.allowed_origin(origin);
        }
    }

    // Credentials cannot be combined with a wildcard origin
    if config.allow_credentials && !config.allows_any_origin() {
        cors = cors.supports_credentials();
    }

    cors
}
