//! Integration tests for registration, OTP sign-in and session handling

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use acct_api::create_app;
use common::{
    access_token, get, post_json, refresh_token, register, test_config, test_state, DEV_CODE,
    PASSWORD,
};

const PHONE: &str = "+251911000000";

#[actix_web::test]
async fn test_phone_registration_and_otp_sign_in() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let registered = register(&app, json!({ "phone": PHONE, "password": PASSWORD })).await;
    assert_eq!(registered["user"]["phone"], PHONE);
    assert_eq!(registered["user"]["isVerified"], false);
    assert_eq!(registered["roles"], json!(["user"]));

    let (status, body) =
        post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": PHONE }), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sent"], true);
    assert_eq!(body["data"]["devCode"], DEV_CODE);
    assert_eq!(body["data"]["expiresIn"], 300);

    for expected_remaining in [2, 1] {
        let (status, body) = post_json(
            &app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "otp": "000000" }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "OTP_INVALID");
        assert_eq!(body["error"]["details"]["remainingAttempts"], expected_remaining);
    }

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/otp/verify",
        json!({ "phone": PHONE, "otp": DEV_CODE }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {}", body);
    let session = &body["data"];
    assert_eq!(session["user"]["isVerified"], true);
    assert!(!access_token(session).is_empty());
    assert!(!refresh_token(session).is_empty());

    // The code is spent
    let (status, body) = post_json(
        &app,
        "/api/v1/auth/otp/verify",
        json!({ "phone": PHONE, "otp": DEV_CODE }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OTP_NOT_FOUND");
}

#[actix_web::test]
async fn test_national_format_reaches_the_same_account() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    register(&app, json!({ "phone": PHONE, "password": PASSWORD })).await;

    let (status, _) =
        post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": "0911000000" }), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/otp/verify",
        json!({ "phone": "0911000000", "otp": DEV_CODE }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["phone"], PHONE);
}

#[actix_web::test]
async fn test_second_request_within_cooldown_is_rate_limited() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, _) =
        post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": PHONE }), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": PHONE }), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");
    assert!(body["error"]["details"]["retryAfterSeconds"].as_i64().unwrap() > 0);
}

#[actix_web::test]
async fn test_too_many_wrong_codes_lock_the_phone() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    register(&app, json!({ "phone": PHONE, "password": PASSWORD })).await;
    post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": PHONE }), None).await;

    let mut last = (StatusCode::OK, json!(null));
    for _ in 0..config.otp.max_attempts {
        last = post_json(
            &app,
            "/api/v1/auth/otp/verify",
            json!({ "phone": PHONE, "otp": "999999" }),
            None,
        )
        .await;
    }
    assert_eq!(last.0, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(last.1["error"]["code"], "OTP_LOCKED");

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/otp/verify",
        json!({ "phone": PHONE, "otp": DEV_CODE }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "OTP_LOCKED");

    let (status, _) =
        post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": PHONE }), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[actix_web::test]
async fn test_verify_for_unknown_phone_is_not_found() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/otp/verify",
        json!({ "phone": PHONE, "otp": DEV_CODE }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
}

#[actix_web::test]
async fn test_resend_requires_an_earlier_code() {
    let mut config = test_config();
    config.otp.cooldown_seconds = 0;
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, body) =
        post_json(&app, "/api/v1/auth/otp/resend", json!({ "phone": PHONE }), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "OTP_NOT_FOUND");

    post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": PHONE }), None).await;
    let (status, body) =
        post_json(&app, "/api/v1/auth/otp/resend", json!({ "phone": PHONE }), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["sent"], true);
}

#[actix_web::test]
async fn test_invalid_phone_is_rejected() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, body) =
        post_json(&app, "/api/v1/auth/otp/request", json!({ "phone": "12345abc" }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PHONE_INVALID");
}

#[actix_web::test]
async fn test_refresh_rotation_rejects_the_old_token() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let session = register(
        &app,
        json!({ "email": "abebe@example.com", "password": PASSWORD }),
    )
    .await;
    let original = refresh_token(&session);

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/refresh-token",
        json!({ "refreshToken": original }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rotated = refresh_token(&body["data"]);
    assert_ne!(rotated, original);
    assert!(!access_token(&body["data"]).is_empty());

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/refresh-token",
        json!({ "refreshToken": original }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_OR_EXPIRED_REFRESH_TOKEN");

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/refresh-token",
        json!({ "refreshToken": rotated }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn test_access_token_sent_to_refresh_is_wrong_type() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let session = register(&app, json!({ "username": "abebe", "password": PASSWORD })).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/refresh-token",
        json!({ "refreshToken": access_token(&session) }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "WRONG_TOKEN_TYPE");
}

#[actix_web::test]
async fn test_login_and_me() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    register(
        &app,
        json!({ "email": "Abebe@Example.com", "password": PASSWORD }),
    )
    .await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "abebe@example.com", "password": "wrong-password" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    let (status, unknown) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "nobody@example.com", "password": PASSWORD }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown["message"], body["message"]);

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "abebe@example.com", "password": PASSWORD }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = access_token(&body["data"]);

    let (status, body) = get(&app, "/api/v1/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "abebe@example.com");
    assert_eq!(body["data"]["roles"], json!(["user"]));
    assert!(body["data"]["user"].get("passwordHash").is_none());
}

#[actix_web::test]
async fn test_duplicate_registration_names_the_field() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    register(&app, json!({ "phone": PHONE, "password": PASSWORD })).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/register",
        json!({ "phone": "0911000000", "password": PASSWORD }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DUPLICATE_VALUE");
    assert_eq!(body["error"]["details"]["field"], "phone");
}

#[actix_web::test]
async fn test_registration_requires_a_password() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, body) =
        post_json(&app, "/api/v1/auth/register", json!({ "phone": PHONE }), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_logout_revokes_the_refresh_token() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let session = register(&app, json!({ "phone": PHONE, "password": PASSWORD })).await;
    let token = access_token(&session);
    let refresh = refresh_token(&session);

    let (status, body) = post_json(
        &app,
        "/api/v1/auth/logout",
        json!({ "refreshToken": refresh }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], true);

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/refresh-token",
        json!({ "refreshToken": refresh }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_all_counts_revoked_sessions() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let session = register(
        &app,
        json!({ "email": "abebe@example.com", "password": PASSWORD }),
    )
    .await;
    post_json(
        &app,
        "/api/v1/auth/login",
        json!({ "email": "abebe@example.com", "password": PASSWORD }),
        None,
    )
    .await;

    let (status, body) =
        post_json(&app, "/api/v1/auth/logout-all", json!({}), Some(&access_token(&session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["revoked"], 2);

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/refresh-token",
        json!({ "refreshToken": refresh_token(&session) }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_protected_routes_require_a_bearer_token() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let (status, body) = get(&app, "/api/v1/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, body) = get(&app, "/api/v1/auth/me", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}
