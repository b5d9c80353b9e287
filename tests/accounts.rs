use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use neohealth_backend::chat::{ChatAssistant, Persona};
use neohealth_backend::reference::ReferenceDataset;
use neohealth_backend::store::{MemoryRecordStore, MemoryUserStore};
use neohealth_backend::{app, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

fn test_app() -> Router {
    let store = Arc::new(MemoryRecordStore::new());
    let users = Arc::new(MemoryUserStore::new());
    let assistant = ChatAssistant::new(store.clone(), Vec::new(), Persona::Casual);
    let reference = ReferenceDataset::bundled().unwrap();
    app(AppState::new(store, users, assistant, reference, 15))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let body = match body {
        Some(v) => Body::from(v.to_string()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn asha() -> Value {
    json!({
        "username": "asha",
        "email": "asha@example.com",
        "mobile": "9876500000",
        "password": "correct horse"
    })
}

#[tokio::test]
async fn register_login_and_profile() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/api/auth/register", Some(asha())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "User created successfully");
    assert!(body["user"].get("password_hash").is_none());
    let id = body["user"]["id"].as_str().unwrap().to_string();

    let login = json!({"mobile": "9876500000", "password": "correct horse"});
    let (status, body) = send(&app, "POST", "/api/auth/login", Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);
    assert_eq!(body["user"]["username"], "asha");

    let (status, body) = send(&app, "GET", &format!("/api/auth/me?user_id={id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "asha@example.com");
}

#[tokio::test]
async fn duplicate_registration_names_the_field() {
    let app = test_app();
    send(&app, "POST", "/api/auth/register", Some(asha())).await;

    let mut other = asha();
    other["username"] = json!("meera");
    other["email"] = json!("meera@example.com");
    let (status, body) = send(&app, "POST", "/api/auth/register", Some(other)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(body["error"]["field"], "mobile");
}

#[tokio::test]
async fn wrong_password_is_401() {
    let app = test_app();
    send(&app, "POST", "/api/auth/register", Some(asha())).await;

    let login = json!({"username": "asha", "password": "guess"});
    let (status, body) = send(&app, "POST", "/api/auth/login", Some(login)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn check_mobile_reports_existing_accounts() {
    let app = test_app();
    send(&app, "POST", "/api/auth/register", Some(asha())).await;

    let lookup = json!({"mobile": "9876500000"});
    let (status, body) = send(&app, "POST", "/api/auth/check-mobile", Some(lookup)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"exists": true, "username": "asha"}));

    let lookup = json!({"mobile": "1234"});
    let (_, body) = send(&app, "POST", "/api/auth/check-mobile", Some(lookup)).await;
    assert_eq!(body, json!({"exists": false}));

    let (status, body) = send(&app, "POST", "/api/auth/check-mobile", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "mobile");
}

#[tokio::test]
async fn malformed_account_requests_use_the_error_envelope() {
    let app = test_app();

    let numeric_mobile = json!({"mobile": 98765});
    let (status, body) = send(&app, "POST", "/api/auth/register", Some(numeric_mobile)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "body");

    let (status, body) = send(&app, "GET", "/api/auth/me?user_id=42", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "user_id");

    let uri = format!("/api/auth/me?user_id={}", Uuid::new_v4());
    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
