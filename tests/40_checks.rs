mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{check_payload, create_token, create_user, read_user, TestApp, PHONE};

use uptime_api::models::collections;

async fn create_check(app: &TestApp, token: &str) -> String {
    let (status, body) = app
        .request(Method::POST, "/checks", Some(token), Some(check_payload()))
        .await;
    assert_eq!(status, StatusCode::OK, "check creation should succeed");
    body["id"].as_str().expect("check id").to_string()
}

#[tokio::test]
async fn create_returns_check_and_links_it_to_the_user() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;
    let token = create_token(&app).await;

    assert!(read_user(&app).await.checks.is_empty());

    let (status, body) = app
        .request(Method::POST, "/checks", Some(&token), Some(check_payload()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let id = body["id"].as_str().expect("check id");
    assert_eq!(id.len(), 20);
    assert_eq!(body["userPhone"], json!(PHONE));
    assert_eq!(body["protocol"], json!("https"));
    assert_eq!(body["url"], json!("example.com"));
    assert_eq!(body["method"], json!("get"));
    assert_eq!(body["successCodes"], json!([200, 201]));
    assert_eq!(body["timeoutSeconds"], json!(3));

    let user = read_user(&app).await;
    assert_eq!(user.checks, vec![id.to_string()]);
    Ok(())
}

#[tokio::test]
async fn create_rejects_invalid_payloads() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;
    let token = create_token(&app).await;

    for (field, bad) in [
        ("protocol", json!("ftp")),
        ("method", json!("patch")),
        ("successCodes", json!([])),
        ("successCodes", json!(["200"])),
        ("timeoutSeconds", json!(0)),
        ("timeoutSeconds", json!(6)),
        ("url", json!("   ")),
    ] {
        let mut payload = check_payload();
        payload[field] = bad.clone();
        let (status, _) = app
            .request(Method::POST, "/checks", Some(&token), Some(payload))
            .await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "field {} = {} should be rejected",
            field,
            bad
        );
    }
    Ok(())
}

#[tokio::test]
async fn create_requires_a_live_token() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;

    let (status, _) = app
        .request(Method::POST, "/checks", None, Some(check_payload()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::POST,
            "/checks",
            Some("aaaaaaaaaaaaaaaaaaaa"),
            Some(check_payload()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::plant_token(&app, "expiredexpiredexpire", PHONE, 1).await;
    let (status, _) = app
        .request(
            Method::POST,
            "/checks",
            Some("expiredexpiredexpire"),
            Some(check_payload()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn create_rejects_token_whose_user_is_gone() -> Result<()> {
    let app = TestApp::new();
    common::plant_token(&app, "tokenwithoutauser000", "5550001111", i64::MAX).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/checks",
            Some("tokenwithoutauser000"),
            Some(check_payload()),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn create_enforces_the_check_limit() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;
    let token = create_token(&app).await;

    // Fill the user's checks list to the configured maximum (5 by default)
    let mut user = read_user(&app).await;
    user.checks = (0..uptime_api::config::config().max_checks)
        .map(|i| format!("existingcheck{:07}", i))
        .collect();
    app.store
        .update(collections::USERS, PHONE, &user)
        .await?;

    let (status, body) = app
        .request(Method::POST, "/checks", Some(&token), Some(check_payload()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        json!("The user already has the maximum number of checks.")
    );
    Ok(())
}

#[tokio::test]
async fn get_is_gated_on_the_checks_own_owner() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;
    let token = create_token(&app).await;
    let id = create_check(&app, &token).await;

    let uri = format!("/checks?id={}", id);

    let (status, body) = app.request(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!(id));
    assert_eq!(body["userPhone"], json!(PHONE));

    // A live token for some other phone must not read it
    common::plant_token(&app, "otherpersonstoken000", "5559999999", i64::MAX).await;
    let (status, _) = app
        .request(Method::GET, &uri, Some("otherpersonstoken000"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn get_unknown_check_is_404_and_bad_id_is_400() -> Result<()> {
    let app = TestApp::new();

    let (status, _) = app
        .request(Method::GET, "/checks?id=aaaaaaaaaaaaaaaaaaaa", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.request(Method::GET, "/checks?id=short", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn update_applies_supplied_fields_only() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;
    let token = create_token(&app).await;
    let id = create_check(&app, &token).await;

    let (status, _) = app
        .request(
            Method::PUT,
            "/checks",
            Some(&token),
            Some(json!({ "id": id, "timeoutSeconds": 5, "method": "post" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app
        .request(Method::GET, &format!("/checks?id={}", id), Some(&token), None)
        .await;
    assert_eq!(body["timeoutSeconds"], json!(5));
    assert_eq!(body["method"], json!("post"));
    assert_eq!(body["url"], json!("example.com"));
    Ok(())
}

#[tokio::test]
async fn update_validates_input_and_ownership() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;
    let token = create_token(&app).await;
    let id = create_check(&app, &token).await;

    let (status, _) = app
        .request(Method::PUT, "/checks", Some(&token), Some(json!({ "id": id })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::PUT,
            "/checks",
            Some(&token),
            Some(json!({ "id": "aaaaaaaaaaaaaaaaaaaa", "timeoutSeconds": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::plant_token(&app, "otherpersonstoken000", "5559999999", i64::MAX).await;
    let (status, _) = app
        .request(
            Method::PUT,
            "/checks",
            Some("otherpersonstoken000"),
            Some(json!({ "id": id, "timeoutSeconds": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn delete_removes_check_and_detaches_it_from_the_user() -> Result<()> {
    let app = TestApp::new();
    create_user(&app).await;
    let token = create_token(&app).await;
    let first = create_check(&app, &token).await;
    let second = create_check(&app, &token).await;

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/checks?id={}", first),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let user = read_user(&app).await;
    assert_eq!(user.checks, vec![second.clone()]);

    let (status, _) = app
        .request(Method::GET, &format!("/checks?id={}", first), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/checks?id={}", first),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("The check ID does not exist."));
    Ok(())
}
