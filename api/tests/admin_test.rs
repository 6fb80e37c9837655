//! Integration tests for roles, profiles, document verification and SMS logs

mod common;

use actix_web::{http::StatusCode, test};
use serde_json::json;

use acct_api::create_app;
use common::{
    access_token, delete, get, post_json, put_json, register, test_config, test_state,
    ADMIN_EMAIL, PASSWORD,
};

#[actix_web::test]
async fn test_role_catalogue_is_admin_only() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;

    let member = register(&app, json!({ "email": "abebe@example.com", "password": PASSWORD })).await;
    let (status, body) = get(&app, "/api/v1/roles", Some(&access_token(&member))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let admin = register(&app, json!({ "email": ADMIN_EMAIL, "password": PASSWORD })).await;
    assert_eq!(admin["roles"], json!(["admin", "user"]));

    let (status, body) = get(&app, "/api/v1/roles", Some(&access_token(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|role| role["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"admin"));
    assert!(names.contains(&"user"));
}

#[actix_web::test]
async fn test_admin_assigns_and_revokes_roles() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let admin = register(&app, json!({ "email": ADMIN_EMAIL, "password": PASSWORD })).await;
    let token = access_token(&admin);
    let member = register(&app, json!({ "username": "abebe", "password": PASSWORD })).await;
    let member_id = member["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = post_json(
        &app,
        &format!("/api/v1/admin/users/{}/roles", member_id),
        json!({ "role": "Admin" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], member_id.as_str());
    assert_eq!(body["data"]["roles"], json!(["admin", "user"]));

    let (status, body) = delete(
        &app,
        &format!("/api/v1/admin/users/{}/roles/admin", member_id),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"], json!(["user"]));

    let (status, _) = post_json(
        &app,
        &format!("/api/v1/admin/users/{}/roles", member_id),
        json!({ "role": "auditor" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(
        &app,
        &format!("/api/v1/admin/users/{}/roles", member_id),
        json!({ "role": "admin" }),
        Some(&access_token(&member)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_document_verification_workflow() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let admin = register(&app, json!({ "email": ADMIN_EMAIL, "password": PASSWORD })).await;
    let admin_token = access_token(&admin);
    let member = register(&app, json!({ "email": "abebe@example.com", "password": PASSWORD })).await;
    let member_token = access_token(&member);

    let submission = json!({
        "verificationType": "identity",
        "documentUrl": "https://files.example.com/id/abebe.pdf",
        "notes": "Passport scan"
    });
    let (status, body) =
        post_json(&app, "/api/v1/verifications", submission.clone(), Some(&member_token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let request_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) =
        post_json(&app, "/api/v1/verifications", submission, Some(&member_token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DUPLICATE_VALUE");
    assert_eq!(body["error"]["details"]["verificationType"], "identity");

    let (status, body) = get(&app, "/api/v1/verifications", Some(&member_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Members cannot review
    let (status, _) = put_json(
        &app,
        &format!("/api/v1/verifications/{}", request_id),
        json!({ "status": "approved" }),
        Some(&member_token),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = get(
        &app,
        "/api/v1/admin/verifications?status=pending",
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = put_json(
        &app,
        &format!("/api/v1/verifications/{}", request_id),
        json!({ "status": "approved", "reviewNotes": "Looks good" }),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");
    assert_eq!(body["data"]["reviewerId"], admin["user"]["id"]);
    assert!(body["data"]["reviewedAt"].is_string());

    // A decided request stays decided
    let (status, body) = put_json(
        &app,
        &format!("/api/v1/verifications/{}", request_id),
        json!({ "status": "rejected" }),
        Some(&admin_token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["from"], "approved");

    let (_, body) = get(
        &app,
        "/api/v1/admin/verifications?status=pending",
        Some(&admin_token),
    )
    .await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_review_of_unknown_request_is_not_found() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let admin = register(&app, json!({ "email": ADMIN_EMAIL, "password": PASSWORD })).await;

    let (status, _) = put_json(
        &app,
        &format!("/api/v1/verifications/{}", uuid::Uuid::new_v4()),
        json!({ "status": "rejected" }),
        Some(&access_token(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_sms_logs_hide_codes() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let admin = register(&app, json!({ "email": ADMIN_EMAIL, "password": PASSWORD })).await;

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/otp/request",
        json!({ "phone": "+251911000000" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(
        &app,
        "/api/v1/admin/sms-logs?phone=0911000000&limit=10",
        Some(&access_token(&admin)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let logs = body["data"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["phone"], "+251911000000");
    assert_eq!(logs[0]["success"], true);
    let message = logs[0]["message"].as_str().unwrap();
    assert!(!message.contains("123456"));
    assert!(message.contains("******"));
}

#[actix_web::test]
async fn test_profile_read_and_partial_update() {
    let config = test_config();
    let app = test::init_service(create_app(test_state(&config), &config)).await;
    let session = register(&app, json!({ "email": "abebe@example.com", "password": PASSWORD })).await;
    let token = access_token(&session);

    let (status, body) = get(&app, "/api/v1/profiles/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["userId"], session["user"]["id"]);
    assert!(body["data"]["firstName"].is_null());

    let (status, body) = put_json(
        &app,
        "/api/v1/profiles",
        json!({ "firstName": "Abebe", "city": "Addis Ababa", "dateOfBirth": "1990-05-17" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["firstName"], "Abebe");
    assert_eq!(body["data"]["dateOfBirth"], "1990-05-17");

    let (status, body) =
        put_json(&app, "/api/v1/profiles", json!({ "lastName": "Kebede" }), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["firstName"], "Abebe");
    assert_eq!(body["data"]["lastName"], "Kebede");
    assert_eq!(body["data"]["city"], "Addis Ababa");

    let (status, body) = put_json(
        &app,
        "/api/v1/profiles",
        json!({ "avatarUrl": "not a url" }),
        Some(&token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], "avatar_url");
}
