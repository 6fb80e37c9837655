//! Integration tests for the response envelope outside the happy path

mod common;

use actix_web::{http::header, http::StatusCode, test};
use serde_json::json;

use acct_api::create_app;
use common::{get, post_json, send, test_config, test_state};

#[actix_web::test]
async fn test_health_reports_storage() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    for uri in ["/health", "/api/v1/health"] {
        let (status, body) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "healthy");
        assert_eq!(body["data"]["storage"], "memory");
    }
}

#[actix_web::test]
async fn test_unknown_route_uses_the_envelope() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, body) = get(&app, "/api/v1/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[actix_web::test]
async fn test_malformed_json_is_a_validation_error() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/login")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[actix_web::test]
async fn test_field_validation_lists_fields() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "not-an-email", "password": "" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["fields"], json!(["email", "password"]));
    assert_eq!(body["error"]["details"]["field"], "email");
}

#[actix_web::test]
async fn test_missing_bearer_is_unauthorized() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    for uri in ["/api/v1/profiles/me", "/api/v1/verifications", "/api/v1/admin/sms-logs"] {
        let (status, body) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }
}

#[actix_web::test]
async fn test_malformed_path_id_is_rejected() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let session = common::register(
        &app,
        json!({ "email": common::ADMIN_EMAIL, "password": common::PASSWORD }),
    )
    .await;

    let (status, body) = common::put_json(
        &app,
        "/api/v1/verifications/not-a-uuid",
        json!({ "status": "approved" }),
        Some(&common::access_token(&session)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
