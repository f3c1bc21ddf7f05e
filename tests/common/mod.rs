#![allow(dead_code)]

//! Test infrastructure for API tests: in-memory state and request helpers.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use expense_tracker::{app::build_app, config::AppConfig, state::AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub fn test_config() -> AppConfig {
    AppConfig::for_tests(SECRET)
}

pub fn test_app() -> Router {
    build_app(AppState::in_memory(Arc::new(test_config())))
}

/// Sends one request through a clone of `app`; returns status and parsed JSON
/// body (`Value::Null` for empty or non-JSON bodies).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {t}"));
    }
    let request = match body {
        Some(b) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Registers a user and returns `(user_id, token)`.
pub async fn register(app: &Router, name: &str, email: &str) -> (String, String) {
    let (status, json) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "pw123456" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {json}");
    (
        json["id"].as_str().unwrap().to_string(),
        json["token"].as_str().unwrap().to_string(),
    )
}

pub async fn create_expense(app: &Router, token: &str, body: Value) -> Value {
    let (status, json) = send(app, "POST", "/api/expenses", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {json}");
    json
}
