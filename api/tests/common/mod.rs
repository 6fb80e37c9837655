//! Shared helpers for the API integration tests
#![allow(dead_code)]

use actix_http::Request;
use actix_web::{
    body::MessageBody,
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test, web,
};
use serde_json::Value;

use acct_api::AppState;
use acct_shared::AppConfig;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "Sup3rSecret!";
pub const DEV_CODE: &str = "123456";

/// Development settings with cheap hashing and a bootstrap admin
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.auth.bcrypt_cost = 4;
    config.auth.bootstrap_admins = vec![ADMIN_EMAIL.to_string()];
    config.maintenance.enabled = false;
    config
}

pub fn test_state(config: &AppConfig) -> web::Data<AppState> {
    web::Data::new(AppState::in_memory(config).expect("in-memory state"))
}

/// Run a request and decode the JSON body
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn with_token(req: test::TestRequest, token: Option<&str>) -> test::TestRequest {
    match token {
        Some(token) => req.insert_header((header::AUTHORIZATION, format!("Bearer {}", token))),
        None => req,
    }
}

pub async fn post_json<S, B>(app: &S, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::post().uri(uri).set_json(body), token).to_request();
    send(app, req).await
}

pub async fn put_json<S, B>(app: &S, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::put().uri(uri).set_json(body), token).to_request();
    send(app, req).await
}

pub async fn get<S, B>(app: &S, uri: &str, token: Option<&str>) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::get().uri(uri), token).to_request();
    send(app, req).await
}

pub async fn delete<S, B>(app: &S, uri: &str, token: Option<&str>) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = with_token(test::TestRequest::delete().uri(uri), token).to_request();
    send(app, req).await
}

/// Register an account and return the `data` of the response
pub async fn register<S, B>(app: &S, body: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, response) = post_json(app, "/api/v1/auth/register", body, None).await;
    assert_eq!(status, StatusCode::CREATED, "registration failed: {}", response);
    response["data"].clone()
}

pub fn access_token(data: &Value) -> String {
    data["accessToken"].as_str().expect("access token").to_string()
}

pub fn refresh_token(data: &Value) -> String {
    data["refreshToken"].as_str().expect("refresh token").to_string()
}
