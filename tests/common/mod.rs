#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use uptime_api::models::{collections, Token, User};
use uptime_api::store::FileStore;
use uptime_api::{app, AppState};

pub const PHONE: &str = "5551234567";
pub const PASSWORD: &str = "pw123";

/// An isolated application instance: the router plus its temp-dir record
/// store, driven in-process without a listening socket.
pub struct TestApp {
    router: Router,
    pub store: FileStore,
    _data_dir: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let data_dir = tempfile::tempdir().expect("temp data dir");
        let store = FileStore::new(data_dir.path());
        let router = app(AppState {
            store: store.clone(),
        });
        Self {
            router,
            store,
            _data_dir: data_dir,
        }
    }

    /// Issue a request and return (status, parsed JSON body). An empty or
    /// non-JSON body comes back as `{}` so callers can assert on it directly.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("token", token);
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible router");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes();
        let value = if bytes.is_empty() {
            json!({})
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({}))
        };
        (status, value)
    }
}

pub fn user_payload() -> Value {
    json!({
        "firstName": "Ann",
        "lastName": "Lee",
        "phone": PHONE,
        "password": PASSWORD,
        "tosAgreement": true
    })
}

pub fn check_payload() -> Value {
    json!({
        "protocol": "https",
        "url": "example.com",
        "method": "get",
        "successCodes": [200, 201],
        "timeoutSeconds": 3
    })
}

/// Create the standard test user through the API.
pub async fn create_user(app: &TestApp) {
    let (status, _) = app
        .request(Method::POST, "/users", None, Some(user_payload()))
        .await;
    assert_eq!(status, StatusCode::OK, "user creation should succeed");
}

/// Issue a token for the standard test user through the API.
pub async fn create_token(app: &TestApp) -> String {
    let (status, body) = app
        .request(
            Method::POST,
            "/tokens",
            None,
            Some(json!({ "phone": PHONE, "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "token creation should succeed");
    body["id"].as_str().expect("token id").to_string()
}

/// Plant a token record directly in the store, bypassing the API; used to
/// simulate expiry without waiting out the clock.
pub async fn plant_token(app: &TestApp, id: &str, phone: &str, expires: i64) {
    let token = Token {
        id: id.to_string(),
        phone: phone.to_string(),
        expires,
    };
    app.store
        .create(collections::TOKENS, id, &token)
        .await
        .expect("plant token record");
}

/// Read the standard test user's record straight from the store.
pub async fn read_user(app: &TestApp) -> User {
    app.store
        .read::<User>(collections::USERS, PHONE)
        .await
        .expect("read user record")
}
