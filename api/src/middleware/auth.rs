//! JWT authentication middleware for protecting API endpoints.
//!
//! The middleware reads the bearer token from the `Authorization` header,
//! verifies it with the [`TokenService`] registered as app data and stores an
//! [`AuthContext`] in the request extensions. Handlers take [`AuthContext`]
//! or [`AdminContext`] as extractors.

use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};
use uuid::Uuid;

use acct_core::domain::entities::token::Claims;
use acct_core::domain::entities::user::ROLE_ADMIN;
use acct_core::errors::{AuthError, DomainError, TokenError};
use acct_core::services::TokenService;

use crate::handlers::ApiError;

/// Identity of the caller, taken from a verified access token
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// User ID extracted from JWT claims
    pub user_id: Uuid,
    /// Role names at the time the token was issued
    pub roles: Vec<String>,
    /// Whether the user's phone is verified
    pub is_verified: bool,
    /// JWT ID for tracking
    pub jti: String,
}

impl AuthContext {
    /// Creates a new authentication context from JWT claims
    pub fn from_claims(claims: Claims) -> Result<Self, DomainError> {
        let user_id = claims.user_id().ok_or(TokenError::InvalidToken)?;
        Ok(Self {
            user_id,
            roles: claims.roles,
            is_verified: claims.is_verified,
            jti: claims.jti,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|role| role == ROLE_ADMIN)
    }
}

/// JWT authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth;

impl JwtAuth {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            match authenticate(&req) {
                Ok(auth_context) => {
                    req.extensions_mut().insert(auth_context);
                    service.call(req).await.map(ServiceResponse::map_into_left_body)
                }
                Err(err) => Ok(req.error_response(err).map_into_right_body()),
            }
        })
    }
}

fn authenticate(req: &ServiceRequest) -> Result<AuthContext, ApiError> {
    let token = extract_bearer_token(req).ok_or(AuthError::Unauthenticated)?;

    let token_service = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| DomainError::internal("token service is not registered"))?;

    let claims = token_service.verify_access_token(&token).map_err(|e| {
        tracing::debug!(error = %e, path = %req.path(), "Access token rejected");
        e
    })?;
    Ok(AuthContext::from_claims(claims)?)
}

/// Extracts Bearer token from Authorization header
fn extract_bearer_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result: Result<Self, Error> = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or_else(|| ApiError::from(AuthError::Unauthenticated).into());

        ready(result)
    }
}

/// Extractor that also requires the `admin` role
#[derive(Debug, Clone)]
pub struct AdminContext(pub AuthContext);

impl FromRequest for AdminContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let result: Result<Self, Error> = match req.extensions().get::<AuthContext>() {
            Some(context) if context.is_admin() => Ok(AdminContext(context.clone())),
            Some(context) => {
                tracing::warn!(
                    user_id = %context.user_id,
                    path = %req.path(),
                    event = "admin_access_denied",
                    "Non-admin called an admin endpoint"
                );
                Err(ApiError::from(AuthError::InsufficientPermissions).into())
            }
            None => Err(ApiError::from(AuthError::Unauthenticated).into()),
        };

        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;

    #[test]
    fn test_extract_bearer_token() {
        let req = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req), Some("test_token_123".to_string()));

        let req_no_bearer = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "test_token_123"))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_bearer), None);

        let req_empty = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer "))
            .to_srv_request();
        assert_eq!(extract_bearer_token(&req_empty), None);

        let req_no_header = actix_test::TestRequest::default().to_srv_request();
        assert_eq!(extract_bearer_token(&req_no_header), None);
    }

    #[test]
    fn test_admin_role_detection() {
        let context = AuthContext {
            user_id: Uuid::new_v4(),
            roles: vec!["user".into(), "admin".into()],
            is_verified: true,
            jti: "jti".into(),
        };
        assert!(context.is_admin());

        let plain = AuthContext {
            roles: vec!["user".into()],
            ..context
        };
        assert!(!plain.is_admin());
    }
}
